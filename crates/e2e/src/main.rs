//! Runs the card delivery scenarios against a live browser
//!
//! Needs a WebDriver server (chromedriver, geckodriver or selenium) and the
//! application under test, unless `--app-command` launches it.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use card_delivery_e2e::app::AppHandle;
use card_delivery_e2e::config::{BrowserKind, SuiteConfig};
use card_delivery_e2e::fixtures::FixtureSet;
use card_delivery_e2e::runner::{RunnerConfig, SuiteRunner};
use card_delivery_e2e::scenarios::{catalogue, select, Tag};
use card_delivery_e2e::webdriver::WebDriverPage;
use card_delivery_e2e::E2eResult;

#[derive(Parser, Debug)]
#[command(name = "card-delivery-e2e")]
#[command(about = "E2E suite for the card delivery booking form")]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL of the booking page
    #[arg(long)]
    base_url: Option<String>,

    /// WebDriver server
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Browser to drive
    #[arg(long, value_enum)]
    browser: Option<BrowserKind>,

    /// Run the browser headless
    #[arg(long, overrides_with = "headed")]
    headless: bool,

    /// Run the browser with a visible window
    #[arg(long, overrides_with = "headless")]
    headed: bool,

    /// Directory holding the CSV fixtures
    #[arg(short, long)]
    fixtures: Option<PathBuf>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Run only scenarios with this tag
    #[arg(short, long, value_enum)]
    tag: Option<Tag>,

    /// Command that launches the application under test
    #[arg(long)]
    app_command: Option<String>,

    /// Print the scenario names and exit
    #[arg(long)]
    list: bool,
}

impl Args {
    fn apply(&self, config: &mut SuiteConfig) {
        if let Some(url) = &self.base_url {
            config.app.base_url = url.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if let Some(browser) = self.browser {
            config.browser.browser = browser;
        }
        if self.headless {
            config.browser.headless = true;
        } else if self.headed {
            config.browser.headless = false;
        }
        if let Some(dir) = &self.fixtures {
            config.fixtures_dir = dir.clone();
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
        if let Some(command) = &self.app_command {
            config.app.command = Some(command.clone());
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let mut config = SuiteConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let fixtures = FixtureSet::load(&config.fixtures_dir)?;
    let scenarios = catalogue(&fixtures);

    if args.list {
        for scenario in &scenarios {
            let tags: Vec<_> = scenario.tags.iter().map(|t| t.as_str()).collect();
            println!("{} [{}]", scenario.name, tags.join(", "));
        }
        return Ok(true);
    }

    let selected = select(&scenarios, args.name.as_deref(), args.tag)?;

    let _app = AppHandle::start(&config.app).await?;
    let page = WebDriverPage::connect(&config.browser, config.timeouts.action()).await?;

    let mut runner = SuiteRunner::new(
        page,
        RunnerConfig {
            base_url: config.app.base_url.clone(),
            timeouts: config.timeouts.clone().into(),
            output_dir: config.output_dir.clone(),
            capture_screenshots: config.capture_screenshots,
            today: None,
        },
    );

    let results = runner.run_scenarios(&selected).await;
    let written = runner.write_results(&results);
    if let Err(e) = runner.close().await {
        error!("Failed to close browser session: {}", e);
    }
    written?;

    info!("{} of {} scenario(s) passed", results.passed, results.total);
    Ok(results.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("card-delivery-e2e").chain(args.iter().copied()))
    }

    #[test]
    fn test_headless_is_a_bare_flag() {
        let mut config = SuiteConfig::default();
        config.browser.headless = false;

        parse(&["--headless"]).unwrap().apply(&mut config);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_headed_turns_headless_off() {
        let mut config = SuiteConfig::default();
        parse(&["--headed"]).unwrap().apply(&mut config);
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_no_window_flag_keeps_config() {
        let mut config = SuiteConfig::default();
        parse(&[]).unwrap().apply(&mut config);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_known_tag_parses() {
        let args = parse(&["--tag", "negative"]).unwrap();
        assert_eq!(args.tag, Some(Tag::Negative));
    }

    #[test]
    fn test_misspelled_tag_is_rejected() {
        assert!(parse(&["--tag", "negatve"]).is_err());
    }
}
