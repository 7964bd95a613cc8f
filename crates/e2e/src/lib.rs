//! Card Delivery E2E Suite
//!
//! Browser-driven tests for the card delivery booking form. The suite:
//! - Waits for (or launches) the application under test
//! - Drives a browser through a WebDriver session
//! - Loads parameterized cases from CSV fixtures
//! - Asserts on field-level validation errors and the success notification
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 card-delivery-e2e (binary)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner<P: Page>                                       │
//! │    ├── run_scenarios(&[Scenario]) -> SuiteResult            │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (catalogue built from CSV fixtures)               │
//! │    ├── select(name, tag): empty selection is an error       │
//! │    ├── steps: fill_form | city_search | calendar            │
//! │    └── expected: accepted | rejected_field(field, message)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CardForm: fill_and_submit, expect_success,                 │
//! │            expect_field_error, pick_date_in_calendar        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page trait                                                 │
//! │    ├── WebDriverPage (fantoccini)                           │
//! │    └── FakeCardApp (in memory, validates with BookingRules) │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod booking;
pub mod config;
pub mod dates;
pub mod error;
pub mod fixtures;
pub mod form;
pub mod page;
pub mod runner;
pub mod scenarios;
pub mod selectors;
pub mod test_support;
pub mod wait;
pub mod webdriver;

pub use booking::{BookingRequest, BookingRules, Field, ValidationOutcome};
pub use dates::DateGenerator;
pub use error::{E2eError, E2eResult};
pub use form::CardForm;
pub use page::Page;
pub use runner::SuiteRunner;
pub use scenarios::Scenario;
