//! Browser automation seam.

use super::RetrievalFailure;
use super::portal::Selector;
use crate::types::SourceDocument;
use async_trait::async_trait;
use std::time::Duration;

pub type DriverResult<T> = std::result::Result<T, RetrievalFailure>;

/// One live browser session.
///
/// Every waiting operation takes its own deadline and should report
/// `RetrievalFailure::Timeout` when it passes. Callers additionally bound
/// each call with a runtime timeout, so a driver that hangs is still cut off.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str, timeout: Duration) -> DriverResult<()>;

    /// Wait for the element, clear it and type `value`.
    async fn fill(&mut self, selector: &Selector, value: &str, timeout: Duration) -> DriverResult<()>;

    async fn press_enter(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<()>;

    async fn click(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<()>;

    /// Wait until the page has finished loading after a navigation.
    async fn wait_for_network_idle(&mut self, timeout: Duration) -> DriverResult<()>;

    /// Switch the element context into the iframe matched by `selector`.
    async fn enter_frame(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<()>;

    async fn leave_frame(&mut self) -> DriverResult<()>;

    /// Click a control that starts a download and wait for the finished file.
    async fn click_and_download(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<SourceDocument>;

    /// Accept a pending dialog, returning its text. `None` when there is none.
    async fn accept_dialog(&mut self) -> DriverResult<Option<String>>;

    async fn close(&mut self) -> DriverResult<()>;
}
