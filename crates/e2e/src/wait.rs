//! Bounded polling for page expectations

use std::fmt;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::page::{ElementState, Page};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition<'a> {
    Visible,
    ContainsText(&'a str),
}

impl Condition<'_> {
    pub fn holds(&self, state: &ElementState) -> bool {
        match self {
            Condition::Visible => state.visible,
            Condition::ContainsText(expected) => state.text.contains(expected),
        }
    }
}

impl fmt::Display for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Visible => f.write_str("visible"),
            Condition::ContainsText(expected) => write!(f, "text containing {:?}", expected),
        }
    }
}

/// Poll `selector` until every condition holds or `timeout` elapses.
///
/// The page is probed at least once even with a zero timeout.
pub async fn wait_until<P>(
    page: &mut P,
    selector: &str,
    conditions: &[Condition<'_>],
    timeout: Duration,
) -> E2eResult<ElementState>
where
    P: Page + ?Sized,
{
    let start = Instant::now();
    loop {
        let state = page.probe(selector).await?;
        if let Some(state) = &state {
            if conditions.iter().all(|condition| condition.holds(state)) {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                debug!(selector, elapsed_ms, "expectation met");
                return Ok(state.clone());
            }
        }

        if start.elapsed() >= timeout {
            return Err(E2eError::AssertionFailed {
                selector: selector.to_string(),
                expected: describe(conditions),
                observed: match state {
                    Some(state) if state.visible => format!("visible, text {:?}", state.text),
                    Some(_) => "hidden".to_string(),
                    None => "no element".to_string(),
                },
                waited: start.elapsed(),
            });
        }

        sleep(POLL_INTERVAL).await;
    }
}

fn describe(conditions: &[Condition<'_>]) -> String {
    conditions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}
