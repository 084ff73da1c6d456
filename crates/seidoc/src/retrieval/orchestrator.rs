use super::driver::{BrowserSession, DriverResult};
use super::portal::{PortalConfig, PortalTimeouts, Selector};
use super::sealing::{Credentials, SealedSecret, SecretSealer};
use super::{RetrievalError, RetrievalFailure, RetrievalStep};
use crate::types::SourceDocument;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Slack given to the driver before the runtime cuts a step off.
const BACKSTOP_GRACE: Duration = Duration::from_secs(5);

type StepResult<T> = std::result::Result<T, RetrievalError>;

pub struct RetrievalOrchestrator {
    portal: PortalConfig,
    sealer: Arc<dyn SecretSealer>,
}

impl RetrievalOrchestrator {
    pub fn new(portal: PortalConfig, sealer: Arc<dyn SecretSealer>) -> Self {
        Self { portal, sealer }
    }

    pub fn sealer(&self) -> &Arc<dyn SecretSealer> {
        &self.sealer
    }

    /// Log in, open the process and download its full PDF.
    ///
    /// No step is retried. The session is closed whether or not the
    /// retrieval succeeds.
    #[cfg_attr(feature = "otel", tracing::instrument(skip(self, session, credentials)))]
    pub async fn retrieve<S>(
        &self,
        session: &mut S,
        credentials: &Credentials,
        process_number: &str,
    ) -> StepResult<SourceDocument>
    where
        S: BrowserSession + ?Sized,
    {
        let outcome = self.run(session, credentials, process_number).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "closing browser session failed");
        }

        match &outcome {
            Ok(document) => tracing::info!(
                process = process_number,
                filename = %document.filename,
                size_bytes = document.bytes.len(),
                "process PDF downloaded"
            ),
            Err(e) => tracing::error!(process = process_number, error = %e, "retrieval failed"),
        }
        outcome
    }

    async fn run<S>(&self, session: &mut S, credentials: &Credentials, process_number: &str) -> StepResult<SourceDocument>
    where
        S: BrowserSession + ?Sized,
    {
        let selectors = &self.portal.selectors;
        let timeouts = &self.portal.timeouts;

        tracing::debug!(url = %self.portal.login_url, "logging in");
        dismiss_dialog(session).await;
        bounded(
            RetrievalStep::Login,
            None,
            timeouts.navigation_secs,
            session.goto(&self.portal.login_url, PortalTimeouts::secs(timeouts.navigation_secs)),
        )
        .await?;

        let username = self.unseal(&credentials.username, "username")?;
        dismiss_dialog(session).await;
        bounded(
            RetrievalStep::Login,
            Some(&selectors.username),
            timeouts.element_secs,
            session.fill(&selectors.username, &username, PortalTimeouts::secs(timeouts.element_secs)),
        )
        .await?;
        drop(username);

        let password = self.unseal(&credentials.password, "password")?;
        bounded(
            RetrievalStep::Login,
            Some(&selectors.password),
            timeouts.element_secs,
            session.fill(&selectors.password, &password, PortalTimeouts::secs(timeouts.element_secs)),
        )
        .await?;
        drop(password);

        bounded(
            RetrievalStep::Login,
            Some(&selectors.submit),
            timeouts.element_secs,
            session.click(&selectors.submit, PortalTimeouts::secs(timeouts.element_secs)),
        )
        .await?;
        bounded(
            RetrievalStep::Login,
            None,
            timeouts.login_idle_secs,
            session.wait_for_network_idle(PortalTimeouts::secs(timeouts.login_idle_secs)),
        )
        .await?;

        tracing::debug!(process = process_number, "searching process");
        dismiss_dialog(session).await;
        bounded(
            RetrievalStep::Search,
            Some(&selectors.search),
            timeouts.search_field_secs,
            session.fill(&selectors.search, process_number, PortalTimeouts::secs(timeouts.search_field_secs)),
        )
        .await?;
        bounded(
            RetrievalStep::Search,
            Some(&selectors.search),
            timeouts.control_secs,
            session.press_enter(&selectors.search, PortalTimeouts::secs(timeouts.control_secs)),
        )
        .await?;
        settle(timeouts.search_settle_secs).await;

        dismiss_dialog(session).await;
        bounded(
            RetrievalStep::Preview,
            Some(&selectors.preview_frame),
            timeouts.control_secs,
            session.enter_frame(&selectors.preview_frame, PortalTimeouts::secs(timeouts.control_secs)),
        )
        .await?;

        dismiss_dialog(session).await;
        bounded(
            RetrievalStep::Generate,
            Some(&selectors.generate_pdf),
            timeouts.control_secs,
            session.click(&selectors.generate_pdf, PortalTimeouts::secs(timeouts.control_secs)),
        )
        .await?;
        settle(timeouts.generate_settle_secs).await;

        dismiss_dialog(session).await;
        let document = bounded(
            RetrievalStep::Download,
            Some(&selectors.download),
            timeouts.download_secs,
            session.click_and_download(&selectors.download, PortalTimeouts::secs(timeouts.download_secs)),
        )
        .await?;

        if let Err(e) = session.leave_frame().await {
            tracing::debug!(error = %e, "leaving preview frame failed");
        }

        Ok(document)
    }

    fn unseal(&self, secret: &SealedSecret, what: &str) -> StepResult<String> {
        let bytes = self.sealer.unseal(secret).map_err(|e| {
            RetrievalError::new(RetrievalStep::Login, None, RetrievalFailure::Credentials(e.to_string()))
        })?;
        String::from_utf8(bytes).map_err(|_| {
            RetrievalError::new(
                RetrievalStep::Login,
                None,
                RetrievalFailure::Credentials(format!("{} is not valid UTF-8", what)),
            )
        })
    }
}

/// Run one driver call under a runtime deadline slightly past the driver's own.
async fn bounded<T, F>(step: RetrievalStep, selector: Option<&Selector>, limit_secs: u64, call: F) -> StepResult<T>
where
    F: Future<Output = DriverResult<T>>,
{
    let selector = selector.map(Selector::value);
    match tokio::time::timeout(Duration::from_secs(limit_secs) + BACKSTOP_GRACE, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(kind)) => Err(RetrievalError::new(step, selector, kind)),
        Err(_) => Err(RetrievalError::new(step, selector, RetrievalFailure::Timeout(limit_secs))),
    }
}

async fn dismiss_dialog<S>(session: &mut S)
where
    S: BrowserSession + ?Sized,
{
    match session.accept_dialog().await {
        Ok(Some(text)) => tracing::warn!(dialog = %text, "accepted unexpected dialog"),
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "dialog check failed"),
    }
}

async fn settle(secs: u64) {
    if secs > 0 {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}
