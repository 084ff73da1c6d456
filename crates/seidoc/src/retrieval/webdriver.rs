//! [`BrowserSession`] over the W3C WebDriver HTTP protocol.
//!
//! Talks to a running chromedriver (or any W3C endpoint that accepts
//! `goog:chromeOptions`). Element lookups poll until their deadline; page
//! idleness is approximated by `document.readyState == "complete"`;
//! downloads are picked up from the configured download directory.

use super::RetrievalFailure;
use super::driver::{BrowserSession, DriverResult};
use super::portal::{BrowserConfig, Selector};
use crate::types::SourceDocument;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

/// Web element reference key from the W3C WebDriver protocol.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const POLL_INTERVAL: Duration = Duration::from_millis(250);
const ENTER_KEY: &str = "\u{E007}";
const PARTIAL_DOWNLOAD_SUFFIXES: &[&str] = &["crdownload", "part", "tmp"];

#[derive(Debug)]
enum WireError {
    /// The remote end answered with a WebDriver error code.
    Protocol { error: String, message: String },
    Transport(String),
}

impl WireError {
    fn is(&self, code: &str) -> bool {
        matches!(self, WireError::Protocol { error, .. } if error == code)
    }

    fn into_failure(self) -> RetrievalFailure {
        match self {
            WireError::Protocol { error, .. } if error == "timeout" || error == "script timeout" => {
                RetrievalFailure::Timeout(0)
            }
            WireError::Protocol { error, message } => RetrievalFailure::Driver(format!("{}: {}", error, message)),
            WireError::Transport(message) => RetrievalFailure::Driver(message),
        }
    }
}

pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
    download_dir: PathBuf,
    closed: bool,
}

impl WebDriverSession {
    /// Open a new browser through the WebDriver endpoint in `config`.
    pub async fn start(config: &BrowserConfig) -> DriverResult<Self> {
        tokio::fs::create_dir_all(&config.download_dir).await.map_err(|e| {
            RetrievalFailure::Driver(format!(
                "cannot create download directory {}: {}",
                config.download_dir.display(),
                e
            ))
        })?;

        let client = Client::builder()
            .build()
            .map_err(|e| RetrievalFailure::Driver(format!("cannot build HTTP client: {}", e)))?;
        let base_url = config.webdriver_url.trim_end_matches('/').to_string();

        let response = send(&client, Method::POST, &format!("{}/session", base_url), Some(capabilities(config)))
            .await
            .map_err(WireError::into_failure)?;

        let session_id = response
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| RetrievalFailure::Driver("new session response has no sessionId".to_string()))?
            .to_string();

        tracing::debug!(session = %session_id, headless = config.headless, "browser session started");

        Ok(Self {
            client,
            base_url,
            session_id,
            download_dir: config.download_dir.clone(),
            closed: false,
        })
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, WireError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        send(&self.client, method, &url, body).await
    }

    /// Poll for an element until it exists or the deadline passes.
    async fn find(&self, selector: &Selector, timeout: Duration) -> DriverResult<String> {
        let (using, value) = match selector {
            Selector::Css(v) => ("css selector", v.as_str()),
            Selector::XPath(v) => ("xpath", v.as_str()),
        };
        let deadline = Instant::now() + timeout;

        loop {
            match self
                .command(Method::POST, "/element", Some(json!({ "using": using, "value": value })))
                .await
            {
                Ok(found) => {
                    return found
                        .get(ELEMENT_KEY)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| RetrievalFailure::Driver("element response has no reference".to_string()));
                }
                Err(e) if e.is("no such element") => {
                    if Instant::now() >= deadline {
                        return Err(RetrievalFailure::ElementMissing);
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => return Err(with_deadline(e.into_failure(), timeout)),
            }
        }
    }

    async fn element_command(&self, element: &str, action: &str, body: Value) -> DriverResult<()> {
        self.command(Method::POST, &format!("/element/{}/{}", element, action), Some(body))
            .await
            .map(|_| ())
            .map_err(WireError::into_failure)
    }

    async fn ready_state(&self) -> Result<String, WireError> {
        let state = self
            .command(
                Method::POST,
                "/execute/sync",
                Some(json!({ "script": "return document.readyState", "args": [] })),
            )
            .await?;
        Ok(state.as_str().unwrap_or_default().to_string())
    }

    async fn download_snapshot(&self) -> DriverResult<HashSet<OsString>> {
        let mut names = HashSet::new();
        let mut entries = tokio::fs::read_dir(&self.download_dir)
            .await
            .map_err(|e| RetrievalFailure::Driver(format!("cannot read download directory: {}", e)))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RetrievalFailure::Driver(format!("cannot read download directory: {}", e)))?
        {
            names.insert(entry.file_name());
        }
        Ok(names)
    }

    /// A new, fully written file in the download directory, if any.
    async fn finished_download(&self, before: &HashSet<OsString>) -> DriverResult<Option<PathBuf>> {
        let current = self.download_snapshot().await?;
        let mut fresh: Vec<PathBuf> = current
            .into_iter()
            .filter(|name| !before.contains(name))
            .map(|name| self.download_dir.join(name))
            .collect();
        fresh.sort();

        if fresh.iter().any(|path| is_partial_download(path)) {
            return Ok(None);
        }
        Ok(fresh.into_iter().next())
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> DriverResult<()> {
        self.command(Method::POST, "/timeouts", Some(json!({ "pageLoad": timeout.as_millis() as u64 })))
            .await
            .map_err(WireError::into_failure)?;
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
            .map_err(|e| with_deadline(e.into_failure(), timeout))
    }

    async fn fill(&mut self, selector: &Selector, value: &str, timeout: Duration) -> DriverResult<()> {
        let element = self.find(selector, timeout).await?;
        self.element_command(&element, "clear", json!({})).await?;
        self.element_command(&element, "value", json!({ "text": value })).await
    }

    async fn press_enter(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<()> {
        let element = self.find(selector, timeout).await?;
        self.element_command(&element, "value", json!({ "text": ENTER_KEY })).await
    }

    async fn click(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<()> {
        let element = self.find(selector, timeout).await?;
        self.element_command(&element, "click", json!({})).await
    }

    async fn wait_for_network_idle(&mut self, timeout: Duration) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.ready_state().await {
                Ok(state) if state == "complete" => return Ok(()),
                Ok(_) => {}
                // Navigation in flight can detach the script context.
                Err(e) if e.is("javascript error") || e.is("no such window") => {}
                Err(e) => return Err(with_deadline(e.into_failure(), timeout)),
            }
            if Instant::now() >= deadline {
                return Err(RetrievalFailure::Timeout(timeout.as_secs()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn enter_frame(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<()> {
        let element = self.find(selector, timeout).await?;
        let mut reference = serde_json::Map::new();
        reference.insert(ELEMENT_KEY.to_string(), Value::String(element));
        self.command(Method::POST, "/frame", Some(json!({ "id": reference })))
            .await
            .map(|_| ())
            .map_err(WireError::into_failure)
    }

    async fn leave_frame(&mut self) -> DriverResult<()> {
        self.command(Method::POST, "/frame/parent", Some(json!({})))
            .await
            .map(|_| ())
            .map_err(WireError::into_failure)
    }

    async fn click_and_download(&mut self, selector: &Selector, timeout: Duration) -> DriverResult<SourceDocument> {
        let before = self.download_snapshot().await?;
        let deadline = Instant::now() + timeout;
        let element = self.find(selector, timeout).await?;
        self.element_command(&element, "click", json!({})).await?;

        loop {
            if let Some(path) = self.finished_download(&before).await? {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| RetrievalFailure::Driver(format!("cannot read {}: {}", path.display(), e)))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "download.pdf".to_string());
                tracing::debug!(path = %path.display(), size_bytes = bytes.len(), "download finished");
                return Ok(SourceDocument::new(filename, bytes));
            }
            if Instant::now() >= deadline {
                return Err(RetrievalFailure::Timeout(timeout.as_secs()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn accept_dialog(&mut self) -> DriverResult<Option<String>> {
        let text = match self.command(Method::GET, "/alert/text", None).await {
            Ok(text) => text.as_str().unwrap_or_default().to_string(),
            Err(e) if e.is("no such alert") => return Ok(None),
            Err(e) => return Err(e.into_failure()),
        };
        self.command(Method::POST, "/alert/accept", Some(json!({})))
            .await
            .map_err(WireError::into_failure)?;
        Ok(Some(text))
    }

    async fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.command(Method::DELETE, "", None)
            .await
            .map(|_| ())
            .map_err(WireError::into_failure)
    }
}

fn capabilities(config: &BrowserConfig) -> Value {
    let mut args = vec!["--no-sandbox".to_string(), "--disable-dev-shm-usage".to_string()];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    if let Some(profile) = &config.user_data_dir {
        args.push(format!("--user-data-dir={}", profile.display()));
    }

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": args,
                    "prefs": {
                        "download.default_directory": config.download_dir.to_string_lossy(),
                        "download.prompt_for_download": false,
                        "plugins.always_open_pdf_externally": true
                    }
                }
            }
        }
    })
}

async fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> Result<Value, WireError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| WireError::Transport(format!("WebDriver request failed: {}", e)))?;
    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .map_err(|e| WireError::Transport(format!("WebDriver response is not JSON ({}): {}", status, e)))?;
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let error = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default();
    Err(WireError::Protocol {
        error: error.to_string(),
        message: message.to_string(),
    })
}

/// Driver-side timeouts don't report their length; fill in the one we asked for.
fn with_deadline(failure: RetrievalFailure, timeout: Duration) -> RetrievalFailure {
    match failure {
        RetrievalFailure::Timeout(_) => RetrievalFailure::Timeout(timeout.as_secs()),
        other => other,
    }
}

fn is_partial_download(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PARTIAL_DOWNLOAD_SUFFIXES.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_carry_download_prefs() {
        let config = BrowserConfig {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            user_data_dir: Some(PathBuf::from("/tmp/profile")),
            download_dir: PathBuf::from("/tmp/downloads"),
        };
        let caps = capabilities(&config);
        let options = &caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"];
        let args: Vec<&str> = options["args"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
        assert!(args.contains(&"--headless=new"));
        assert!(args.contains(&"--user-data-dir=/tmp/profile"));
        assert_eq!(options["prefs"]["download.default_directory"], "/tmp/downloads");
        assert_eq!(options["prefs"]["download.prompt_for_download"], false);
    }

    #[test]
    fn test_headful_has_no_headless_flag() {
        let config = BrowserConfig {
            headless: false,
            ..Default::default()
        };
        let caps = capabilities(&config);
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"].to_string();
        assert!(!args.contains("headless"));
    }

    #[test]
    fn test_partial_download_detection() {
        assert!(is_partial_download(Path::new("/d/SEI.pdf.crdownload")));
        assert!(is_partial_download(Path::new("/d/SEI.pdf.part")));
        assert!(!is_partial_download(Path::new("/d/SEI.pdf")));
    }

    #[test]
    fn test_wire_error_mapping() {
        let timeout = WireError::Protocol {
            error: "timeout".to_string(),
            message: "page load".to_string(),
        };
        assert_eq!(
            with_deadline(timeout.into_failure(), Duration::from_secs(30)),
            RetrievalFailure::Timeout(30)
        );

        let other = WireError::Protocol {
            error: "stale element reference".to_string(),
            message: "gone".to_string(),
        };
        assert!(matches!(other.into_failure(), RetrievalFailure::Driver(msg) if msg.contains("stale")));
    }

    #[tokio::test]
    async fn test_start_fails_without_driver() {
        let dir = tempfile::tempdir().unwrap();
        let config = BrowserConfig {
            webdriver_url: "http://127.0.0.1:1".to_string(),
            headless: true,
            user_data_dir: None,
            download_dir: dir.path().join("downloads"),
        };
        let result = WebDriverSession::start(&config).await;
        assert!(matches!(result, Err(RetrievalFailure::Driver(_))));
        assert!(dir.path().join("downloads").is_dir());
    }
}
