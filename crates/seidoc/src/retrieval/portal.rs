//! Portal layout and browser settings. Selectors are data, not code: when the
//! portal markup changes, only configuration changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOGIN_URL: &str =
    "https://sei.anvisa.gov.br/sip/login.php?sigla_orgao_sistema=ANVISA&sigla_sistema=SEI";

/// How to locate an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    Css(String),
    #[serde(rename = "xpath")]
    XPath(String),
}

impl Selector {
    pub fn css(value: impl Into<String>) -> Self {
        Selector::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Selector::XPath(value.into())
    }

    pub fn value(&self) -> &str {
        match self {
            Selector::Css(v) | Selector::XPath(v) => v,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Element locations on the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalSelectors {
    #[serde(default = "default_username")]
    pub username: Selector,
    #[serde(default = "default_password")]
    pub password: Selector,
    #[serde(default = "default_submit")]
    pub submit: Selector,
    #[serde(default = "default_search")]
    pub search: Selector,
    #[serde(default = "default_preview_frame")]
    pub preview_frame: Selector,
    #[serde(default = "default_generate_pdf")]
    pub generate_pdf: Selector,
    #[serde(default = "default_download")]
    pub download: Selector,
}

fn default_username() -> Selector {
    Selector::css("#txtUsuario")
}
fn default_password() -> Selector {
    Selector::css("#pwdSenha")
}
fn default_submit() -> Selector {
    Selector::css("#sbmAcessar")
}
fn default_search() -> Selector {
    Selector::css("#txtPesquisaRapida")
}
fn default_preview_frame() -> Selector {
    Selector::css("iframe#ifrVisualizacao")
}
fn default_generate_pdf() -> Selector {
    Selector::xpath(r#"//*[@id="divArvoreAcoes"]/a[7]/img"#)
}
fn default_download() -> Selector {
    Selector::xpath(r#"//*[@id="divInfraBarraComandosSuperior"]/button[1]"#)
}

impl Default for PortalSelectors {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            submit: default_submit(),
            search: default_search(),
            preview_frame: default_preview_frame(),
            generate_pdf: default_generate_pdf(),
            download: default_download(),
        }
    }
}

/// Per-step deadlines and settle delays, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalTimeouts {
    #[serde(default = "default_navigation")]
    pub navigation_secs: u64,
    #[serde(default = "default_element")]
    pub element_secs: u64,
    #[serde(default = "default_login_idle")]
    pub login_idle_secs: u64,
    #[serde(default = "default_search_field")]
    pub search_field_secs: u64,
    #[serde(default = "default_control")]
    pub control_secs: u64,
    #[serde(default = "default_download_wait")]
    pub download_secs: u64,
    #[serde(default = "default_search_settle")]
    pub search_settle_secs: u64,
    #[serde(default = "default_generate_settle")]
    pub generate_settle_secs: u64,
}

fn default_navigation() -> u64 {
    30
}
fn default_element() -> u64 {
    20
}
fn default_login_idle() -> u64 {
    20
}
fn default_search_field() -> u64 {
    40
}
fn default_control() -> u64 {
    10
}
fn default_download_wait() -> u64 {
    60
}
fn default_search_settle() -> u64 {
    5
}
fn default_generate_settle() -> u64 {
    2
}

impl Default for PortalTimeouts {
    fn default() -> Self {
        Self {
            navigation_secs: default_navigation(),
            element_secs: default_element(),
            login_idle_secs: default_login_idle(),
            search_field_secs: default_search_field(),
            control_secs: default_control(),
            download_secs: default_download_wait(),
            search_settle_secs: default_search_settle(),
            generate_settle_secs: default_generate_settle(),
        }
    }
}

impl PortalTimeouts {
    /// All waits zeroed except the hard deadlines; for driving fakes in tests.
    pub fn without_settle_delays(mut self) -> Self {
        self.search_settle_secs = 0;
        self.generate_settle_secs = 0;
        self
    }

    pub(crate) fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default)]
    pub selectors: PortalSelectors,
    #[serde(default)]
    pub timeouts: PortalTimeouts,
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            selectors: PortalSelectors::default(),
            timeouts: PortalTimeouts::default(),
        }
    }
}

/// Settings for the automated browser itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver, geckodriver, selenium).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Persistent profile directory, so the portal keeps cookies between runs.
    #[serde(default)]
    pub user_data_dir: Option<PathBuf>,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_true() -> bool {
    true
}
fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("seidoc-downloads")
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            user_data_dir: None,
            download_dir: default_download_dir(),
        }
    }
}
