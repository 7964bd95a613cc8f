//! Suite configuration
//!
//! Values come from [`SuiteConfig::default`], then an optional YAML file,
//! then `CARD_E2E_*` environment variables; the CLI applies its flags last.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

pub const ENV_PREFIX: &str = "CARD_E2E_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application under test
    pub app: AppConfig,

    /// WebDriver session
    pub browser: BrowserConfig,

    pub timeouts: TimeoutConfig,

    /// Directory holding the CSV fixtures
    pub fixtures_dir: PathBuf,

    /// Directory for the results file and failure screenshots
    pub output_dir: PathBuf,

    /// Save a screenshot when a scenario fails
    pub capture_screenshots: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            browser: BrowserConfig::default(),
            timeouts: TimeoutConfig::default(),
            fixtures_dir: PathBuf::from("crates/e2e/fixtures"),
            output_dir: PathBuf::from("test-results"),
            capture_screenshots: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// URL the booking page is served at
    pub base_url: String,

    /// Command that starts the application, e.g.
    /// `java -jar artifacts/app-card-delivery.jar`. When unset the
    /// application is expected to be running already.
    pub command: Option<String>,

    /// How long to wait for the application to answer
    pub startup_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9999".to_string(),
            command: None,
            startup_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver server (chromedriver, geckodriver, selenium)
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            window_width: 1280,
            window_height: 720,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Wait for the success notification
    pub notification_secs: u64,

    /// Wait for any other expectation
    pub expectation_ms: u64,

    /// Wait for an action's target element
    pub action_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            notification_secs: 15,
            expectation_ms: 4000,
            action_ms: 4000,
        }
    }
}

impl TimeoutConfig {
    pub fn notification(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn expectation(&self) -> Duration {
        Duration::from_millis(self.expectation_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }
}

impl SuiteConfig {
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Defaults, or the file at `path` when given, with environment
    /// overrides applied
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CARD_E2E_*` overrides looked up through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(url) = var("BASE_URL") {
            self.app.base_url = url;
        }
        if let Some(command) = var("APP_COMMAND") {
            self.app.command = Some(command).filter(|c| !c.trim().is_empty());
        }
        if let Some(secs) = var("APP_STARTUP_TIMEOUT_SECS") {
            self.app.startup_timeout_secs = parse_number("APP_STARTUP_TIMEOUT_SECS", &secs)?;
        }
        if let Some(url) = var("WEBDRIVER_URL") {
            self.browser.webdriver_url = url;
        }
        if let Some(browser) = var("BROWSER") {
            self.browser.browser = browser.parse()?;
        }
        if let Some(headless) = var("HEADLESS") {
            self.browser.headless = parse_flag("HEADLESS", &headless)?;
        }
        if let Some(secs) = var("NOTIFICATION_TIMEOUT_SECS") {
            self.timeouts.notification_secs = parse_number("NOTIFICATION_TIMEOUT_SECS", &secs)?;
        }
        if let Some(dir) = var("FIXTURES_DIR") {
            self.fixtures_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject values that cannot work before any browser is started
    pub fn validate(&self) -> E2eResult<()> {
        for (name, url) in [
            ("app.base_url", &self.app.base_url),
            ("browser.webdriver_url", &self.browser.webdriver_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(E2eError::Config(format!("{} must be an http(s) URL: {}", name, url)));
            }
        }
        if self.timeouts.notification_secs == 0 {
            return Err(E2eError::Config("timeouts.notification_secs must be positive".into()));
        }
        Ok(())
    }
}

fn parse_number(name: &str, value: &str) -> E2eResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| E2eError::Config(format!("{}{}: not a number: {}", ENV_PREFIX, name, value)))
}

fn parse_flag(name: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(E2eError::Config(format!("{}{}: not a flag: {}", ENV_PREFIX, name, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.app.base_url, "http://localhost:9999");
        assert_eq!(config.timeouts.notification(), Duration::from_secs(15));
        assert_eq!(config.browser.browser, BrowserKind::Chrome);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
app:
  base_url: http://127.0.0.1:7777
browser:
  browser: firefox
  headless: false
timeouts:
  notification_secs: 20
"#;
        let config = SuiteConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.app.base_url, "http://127.0.0.1:7777");
        assert_eq!(config.app.startup_timeout_secs, 30);
        assert_eq!(config.browser.browser, BrowserKind::Firefox);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
        assert_eq!(config.timeouts.notification_secs, 20);
        assert_eq!(config.timeouts.expectation_ms, 4000);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.yaml");
        let yaml = "output_dir: /tmp/card-results\ncapture_screenshots: false\n";
        std::fs::write(&path, yaml).unwrap();

        let config = SuiteConfig::from_file(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/card-results"));
        assert!(!config.capture_screenshots);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CARD_E2E_BASE_URL", "http://app:9999"),
            ("CARD_E2E_BROWSER", "Firefox"),
            ("CARD_E2E_HEADLESS", "0"),
            ("CARD_E2E_APP_COMMAND", "java -jar app.jar"),
            ("CARD_E2E_NOTIFICATION_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.app.base_url, "http://app:9999");
        assert_eq!(config.app.command.as_deref(), Some("java -jar app.jar"));
        assert_eq!(config.browser.browser, BrowserKind::Firefox);
        assert!(!config.browser.headless);
        assert_eq!(config.timeouts.notification_secs, 30);
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_overrides(|key| (key == "CARD_E2E_HEADLESS").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = SuiteConfig::default();
        config.browser.webdriver_url = "localhost:4444".to_string();
        assert!(config.validate().is_err());
    }
}
