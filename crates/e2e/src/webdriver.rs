//! [`Page`] over a WebDriver session

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::{BrowserConfig, BrowserKind};
use crate::error::{E2eError, E2eResult};
use crate::page::{ElementState, Page, TextMatch};
use crate::wait::POLL_INTERVAL;

pub struct WebDriverPage {
    client: Client,
    /// How long actions wait for their target to show up
    action_timeout: Duration,
}

impl WebDriverPage {
    /// Start a new session on the configured WebDriver server
    pub async fn connect(config: &BrowserConfig, action_timeout: Duration) -> E2eResult<Self> {
        info!(
            webdriver = %config.webdriver_url,
            browser = config.browser.as_str(),
            headless = config.headless,
            "Starting WebDriver session"
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(config));
        let client = builder.connect(&config.webdriver_url).await?;

        Ok(Self { client, action_timeout })
    }

    async fn locate(&self, selector: &str) -> E2eResult<Element> {
        let found = self
            .client
            .wait()
            .at_most(self.action_timeout)
            .for_element(Locator::Css(selector))
            .await;

        match found {
            Ok(element) => Ok(element),
            Err(CmdError::WaitTimeout) => Err(not_found(selector)),
            Err(err) if err.is_no_such_element() => Err(not_found(selector)),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn open(&mut self, url: &str) -> E2eResult<()> {
        debug!(url, "open");
        self.client.goto(url).await?;
        Ok(())
    }

    async fn set_value(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        debug!(selector, value, "set value");
        let element = self.locate(selector).await?;
        element.clear().await?;
        element.send_keys(value).await?;
        Ok(())
    }

    async fn replace_value(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        debug!(selector, value, "replace value");
        let element = self.locate(selector).await?;
        element.send_keys(&select_to_start()).await?;
        element.send_keys(&char::from(Key::Delete).to_string()).await?;
        element.send_keys(value).await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        debug!(selector, "click");
        self.locate(selector).await?.click().await?;
        Ok(())
    }

    async fn click_matching(&mut self, selector: &str, text: TextMatch<'_>) -> E2eResult<()> {
        debug!(selector, text = %text.describe(), "click matching");
        let start = Instant::now();
        loop {
            for element in self.client.find_all(Locator::Css(selector)).await? {
                // Collections re-render while suggestions are filtered; an
                // element that vanished between lookup and read is skipped.
                let Ok(content) = element.text().await else {
                    continue;
                };
                if text.matches(&content) {
                    element.click().await?;
                    return Ok(());
                }
            }

            if start.elapsed() >= self.action_timeout {
                return Err(not_found(&format!("{} with {}", selector, text.describe())));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn probe(&mut self, selector: &str) -> E2eResult<Option<ElementState>> {
        let mut hidden = None;
        for element in self.client.find_all(Locator::Css(selector)).await? {
            if let Some(visible) = observe(selector, read_state(&element).await, &mut hidden) {
                return Ok(Some(visible));
            }
        }
        Ok(hidden)
    }

    async fn screenshot(&mut self) -> E2eResult<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }

    async fn close(&mut self) -> E2eResult<()> {
        info!("Closing WebDriver session");
        self.client.clone().close().await?;
        Ok(())
    }
}

async fn read_state(element: &Element) -> Result<ElementState, CmdError> {
    if element.is_displayed().await? {
        Ok(ElementState::visible(element.text().await?))
    } else {
        Ok(ElementState::hidden())
    }
}

/// Fold one element's state into a probe. Returns the state once a visible
/// element is seen; remembers the first hidden one. An element that went
/// stale while being read is skipped and the next poll looks again.
fn observe(
    selector: &str,
    read: Result<ElementState, CmdError>,
    hidden: &mut Option<ElementState>,
) -> Option<ElementState> {
    match read {
        Ok(state) if state.visible => Some(state),
        Ok(state) => {
            hidden.get_or_insert(state);
            None
        }
        Err(err) => {
            debug!(selector, error = %err, "skipping detached element");
            None
        }
    }
}

fn not_found(selector: &str) -> E2eError {
    E2eError::ElementNotFound {
        selector: selector.to_string(),
    }
}

/// Shift+Home, then release the modifier
fn select_to_start() -> String {
    [Key::Shift, Key::Home, Key::Null]
        .into_iter()
        .map(char::from)
        .collect()
}

fn capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let window = format!("--window-size={},{}", config.window_width, config.window_height);
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!(config.browser.as_str()));

    match config.browser {
        BrowserKind::Chrome => {
            let mut args = vec![window, "--no-sandbox".to_string()];
            if config.headless {
                args.push("--headless=new".to_string());
            }
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let mut args = vec![
                format!("--width={}", config.window_width),
                format!("--height={}", config.window_height),
            ];
            if config.headless {
                args.push("-headless".to_string());
            }
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_capabilities() {
        let config = BrowserConfig::default();
        let caps = capabilities(&config);

        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--window-size=1280,720"));
    }

    #[test]
    fn test_headed_firefox_capabilities() {
        let config = BrowserConfig {
            browser: BrowserKind::Firefox,
            headless: false,
            ..BrowserConfig::default()
        };
        let caps = capabilities(&config);

        assert_eq!(caps["browserName"], "firefox");
        let args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "-headless"));
    }

    #[test]
    fn test_select_to_start_releases_modifiers() {
        let keys: Vec<char> = select_to_start().chars().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[2], char::from(Key::Null));
    }

    #[test]
    fn test_observe_skips_element_lost_while_reading() {
        let mut hidden = None;
        assert_eq!(observe("x", Err(CmdError::WaitTimeout), &mut hidden), None);
        assert_eq!(hidden, None);

        assert_eq!(observe("x", Ok(ElementState::hidden()), &mut hidden), None);
        assert_eq!(observe("x", Err(CmdError::WaitTimeout), &mut hidden), None);
        assert_eq!(hidden, Some(ElementState::hidden()));

        let shown = observe("x", Ok(ElementState::visible("Успешно")), &mut hidden);
        assert_eq!(shown, Some(ElementState::visible("Успешно")));
    }
}
