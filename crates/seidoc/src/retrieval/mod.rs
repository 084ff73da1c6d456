//! Authenticated download of a process PDF from the SEI portal.
//!
//! The [`RetrievalOrchestrator`] drives a [`BrowserSession`] through
//! login, search, preview, generate and download. Every step has its own
//! deadline and failures carry the step and the selector involved.

pub mod driver;
pub mod orchestrator;
pub mod portal;
pub mod sealing;
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use driver::{BrowserSession, DriverResult};
pub use orchestrator::RetrievalOrchestrator;
pub use portal::{BrowserConfig, PortalConfig, PortalSelectors, PortalTimeouts, Selector};
pub use sealing::{Credentials, EphemeralSealer, SealedSecret, SecretSealer};
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverSession;

use std::fmt;
use thiserror::Error;

/// Stages of a retrieval, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrievalStep {
    Login,
    Search,
    Preview,
    Generate,
    Download,
}

impl fmt::Display for RetrievalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetrievalStep::Login => "login",
            RetrievalStep::Search => "search",
            RetrievalStep::Preview => "preview",
            RetrievalStep::Generate => "generate",
            RetrievalStep::Download => "download",
        };
        f.write_str(name)
    }
}

/// What went wrong inside a step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalFailure {
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    #[error("element not found")]
    ElementMissing,

    #[error("browser driver error: {0}")]
    Driver(String),

    #[error("credentials unusable: {0}")]
    Credentials(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("retrieval {} step failed ({}): {}", .step, .selector.as_deref().unwrap_or("no selector"), .kind)]
pub struct RetrievalError {
    pub step: RetrievalStep,
    pub selector: Option<String>,
    pub kind: RetrievalFailure,
}

impl RetrievalError {
    pub fn new(step: RetrievalStep, selector: Option<&str>, kind: RetrievalFailure) -> Self {
        Self {
            step,
            selector: selector.map(str::to_string),
            kind,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, RetrievalFailure::Timeout(_))
    }
}
