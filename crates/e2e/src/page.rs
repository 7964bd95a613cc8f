//! The browser seam
//!
//! Everything the suite does to the page goes through [`Page`]. The WebDriver
//! backed implementation lives in [`crate::webdriver`]; the in-memory double
//! in [`crate::test_support`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// Snapshot of one element at the time it was probed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub visible: bool,
    pub text: String,
}

impl ElementState {
    pub fn visible(text: impl Into<String>) -> Self {
        Self { visible: true, text: text.into() }
    }

    pub fn hidden() -> Self {
        Self { visible: false, text: String::new() }
    }
}

/// How an element's text is matched when picking one out of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch<'a> {
    /// Whole text, ignoring surrounding whitespace
    Exact(&'a str),
    Contains(&'a str),
}

impl TextMatch<'_> {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextMatch::Exact(expected) => text.trim() == *expected,
            TextMatch::Contains(expected) => text.contains(expected),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TextMatch::Exact(expected) => format!("exact text {:?}", expected),
            TextMatch::Contains(expected) => format!("text containing {:?}", expected),
        }
    }
}

#[async_trait]
pub trait Page: Send {
    /// Load `url`, discarding all page state
    async fn open(&mut self, url: &str) -> E2eResult<()>;

    /// Clear an input and type `value`
    async fn set_value(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    /// Select everything from the caret to the start, delete it, then type
    /// `value`. Masked inputs ignore a plain clear.
    async fn replace_value(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    async fn click(&mut self, selector: &str) -> E2eResult<()>;

    /// Click the first element under `selector` whose text matches
    async fn click_matching(&mut self, selector: &str, text: TextMatch<'_>) -> E2eResult<()>;

    /// Current state of the first visible element under `selector`, falling
    /// back to the first hidden one. `None` when nothing matches.
    async fn probe(&mut self, selector: &str) -> E2eResult<Option<ElementState>>;

    /// PNG screenshot of the viewport
    async fn screenshot(&mut self) -> E2eResult<Vec<u8>>;

    async fn close(&mut self) -> E2eResult<()> {
        Ok(())
    }
}
