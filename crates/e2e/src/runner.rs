//! Runs scenarios against a page and collects the results

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::dates::DateGenerator;
use crate::error::E2eResult;
use crate::form::{CardForm, Timeouts};
use crate::page::Page;
use crate::scenarios::{Scenario, Tag};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub tags: Vec<Tag>,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<Screenshot>,
}

/// Screenshot saved when a scenario failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub path: String,
    pub sha256: String,
}

/// Result of running a list of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Page loaded before every scenario
    pub base_url: String,
    pub timeouts: Timeouts,
    /// Output directory for results and screenshots
    pub output_dir: PathBuf,
    pub capture_screenshots: bool,
    /// Fixed "today"; the local date at the start of each scenario when unset
    pub today: Option<NaiveDate>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9999".to_string(),
            timeouts: Timeouts::default(),
            output_dir: PathBuf::from("test-results"),
            capture_screenshots: true,
            today: None,
        }
    }
}

/// Runs scenarios one after another on a single page. Each scenario starts
/// from a fresh page load; nothing else carries over between them.
pub struct SuiteRunner<P: Page> {
    page: P,
    config: RunnerConfig,
}

impl<P: Page> SuiteRunner<P> {
    pub fn new(page: P, config: RunnerConfig) -> Self {
        Self { page, config }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> SuiteResult {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("Results: {} passed, {} failed ({} ms)", passed, failed, duration_ms);

        SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run one scenario; failures are reported in the result, never raised
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let dates = self
            .config
            .today
            .map(DateGenerator::new)
            .unwrap_or_else(DateGenerator::today);

        let outcome = async {
            self.page.open(&self.config.base_url).await?;
            let mut form = CardForm::new(&mut self.page, dates).with_timeouts(self.config.timeouts);
            scenario.run(&mut form).await
        }
        .await;

        let error = outcome.err().map(|e| e.to_string());
        let screenshot = match &error {
            Some(_) if self.config.capture_screenshots => {
                self.capture_screenshot(&scenario.name).await
            }
            _ => None,
        };

        ScenarioResult {
            name: scenario.name.clone(),
            tags: scenario.tags.clone(),
            success: error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            error,
            screenshot,
        }
    }

    async fn capture_screenshot(&mut self, name: &str) -> Option<Screenshot> {
        let saved = match self.page.screenshot().await {
            Ok(png) => save_screenshot(&self.config.output_dir, name, &png),
            Err(e) => Err(e),
        };
        match saved {
            Ok(screenshot) => {
                info!("Screenshot saved: {}", screenshot.path);
                Some(screenshot)
            }
            Err(e) => {
                warn!("No screenshot for '{}': {}", name, e);
                None
            }
        }
    }

    /// Write results to `<output_dir>/test-results.json`
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }

    pub async fn close(&mut self) -> E2eResult<()> {
        self.page.close().await
    }
}

fn save_screenshot(output_dir: &Path, name: &str, png: &[u8]) -> E2eResult<Screenshot> {
    let dir = output_dir.join("screenshots");
    std::fs::create_dir_all(&dir)?;

    let path = dir.join(format!("{}.png", file_stem(name)));
    std::fs::write(&path, png)?;

    Ok(Screenshot {
        path: path.to_string_lossy().to_string(),
        sha256: hex::encode(Sha256::digest(png)),
    })
}

/// Scenario names carry brackets; keep file names portable
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}
