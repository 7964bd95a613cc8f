//! Error types for the card delivery suite

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Application failed to start: {0}")]
    AppStartup(String),

    #[error("Application at {url} not reachable after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("WebDriver session error: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Assertion failed on '{selector}' after {waited:?}: expected {expected}, observed {observed}")]
    AssertionFailed {
        selector: String,
        expected: String,
        observed: String,
        waited: Duration,
    },

    #[error("Invalid date pattern: {0:?}")]
    DatePattern(String),

    #[error("Date offset out of range: {0} days")]
    DateOutOfRange(i64),

    #[error("Fixture error in {file}: {reason}")]
    Fixture { file: String, reason: String },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("No scenarios selected ({0})")]
    NoScenariosSelected(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
