//! The scenario catalogue
//!
//! One [`Scenario`] per test case: fixed inputs, the steps that drive the
//! form, and the outcome the application must show.

use serde::{Deserialize, Serialize};

use crate::booking::{messages, BookingRequest, Field, ValidationOutcome};
use crate::error::{E2eError, E2eResult};
use crate::fixtures::FixtureSet;
use crate::form::CardForm;
use crate::page::Page;

pub const DEFAULT_CITY: &str = "Симферополь";
pub const DEFAULT_NAME: &str = "Вася";
pub const DEFAULT_PHONE: &str = "+79114359999";
pub const WIDGET_NAME: &str = "ВАСЯ ПЕТРОВ";

/// Offset the "too soon" scenarios book for, one day inside the lead time
pub const TOO_SOON_DAYS: i64 = 2;
/// Offset picked through the calendar widget
pub const CALENDAR_DAYS: i64 = 7;
/// A date that can never exist
pub const IMPOSSIBLE_DATE: &str = "31.02.2145";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Booking goes through
    Positive,
    /// A field is rejected
    Negative,
    /// Uses the autocomplete or calendar widget
    Widget,
    /// Driven by a CSV fixture row
    Fixture,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Positive => "positive",
            Tag::Negative => "negative",
            Tag::Widget => "widget",
            Tag::Fixture => "fixture",
        }
    }
}

/// How a scenario drives the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Steps {
    /// Type every field of the request and submit
    FillForm { request: BookingRequest },
    /// Narrow the city list with `query` and pick `city`; other fields come
    /// from `request`
    CitySearch {
        query: String,
        city: String,
        request: BookingRequest,
    },
    /// Pick the date in the calendar popup; other fields come from `request`
    Calendar { offset_days: i64, request: BookingRequest },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub tags: Vec<Tag>,
    pub steps: Steps,
    pub expected: ValidationOutcome,
}

impl Scenario {
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// The request the application ends up evaluating
    pub fn effective_request(&self) -> BookingRequest {
        match &self.steps {
            Steps::FillForm { request } => request.clone(),
            Steps::CitySearch { city, request, .. } => BookingRequest {
                city: city.clone(),
                ..request.clone()
            },
            Steps::Calendar { offset_days, request } => BookingRequest {
                date: crate::booking::DateInput::Offset(*offset_days),
                ..request.clone()
            },
        }
    }

    /// Drive the form on an opened page and assert the expected outcome
    pub async fn run<P: Page + ?Sized>(&self, form: &mut CardForm<'_, P>) -> E2eResult<()> {
        let date = match &self.steps {
            Steps::FillForm { request } => form.fill_and_submit(request).await?,
            Steps::CitySearch { query, city, request } => {
                form.choose_city_suggestion(query, city).await?;
                let date = request.date_text(form.dates())?;
                form.set_date_literal(&date).await?;
                fill_rest_and_submit(form, request).await?;
                date
            }
            Steps::Calendar { offset_days, request } => {
                form.set_city(&request.city).await?;
                let date = form.pick_date_in_calendar(*offset_days).await?;
                fill_rest_and_submit(form, request).await?;
                date
            }
        };
        form.expect_outcome(&self.expected, &date).await
    }
}

async fn fill_rest_and_submit<P: Page + ?Sized>(
    form: &mut CardForm<'_, P>,
    request: &BookingRequest,
) -> E2eResult<()> {
    form.set_name(&request.name).await?;
    form.set_phone(&request.phone).await?;
    if request.agreement {
        form.accept_agreement().await?;
    }
    form.submit().await
}

fn default_request() -> BookingRequest {
    BookingRequest::new(DEFAULT_CITY, crate::dates::LEAD_TIME_DAYS, DEFAULT_NAME, DEFAULT_PHONE)
}

fn fill(
    name: impl Into<String>,
    tags: &[Tag],
    request: BookingRequest,
    expected: ValidationOutcome,
) -> Scenario {
    Scenario {
        name: name.into(),
        tags: tags.to_vec(),
        steps: Steps::FillForm { request },
        expected,
    }
}

/// Scenarios matching `name` and `tag`; all of them when neither is given.
/// Selecting nothing is an error.
pub fn select(
    scenarios: &[Scenario],
    name: Option<&str>,
    tag: Option<Tag>,
) -> E2eResult<Vec<Scenario>> {
    if let Some(name) = name {
        if !scenarios.iter().any(|s| s.name == name) {
            return Err(E2eError::ScenarioNotFound(name.to_string()));
        }
    }

    let selected: Vec<Scenario> = scenarios
        .iter()
        .filter(|s| name.map_or(true, |name| s.name == name))
        .filter(|s| tag.map_or(true, |tag| s.has_tag(tag)))
        .cloned()
        .collect();

    if selected.is_empty() {
        let mut filter = Vec::new();
        if let Some(name) = name {
            filter.push(format!("name {}", name));
        }
        if let Some(tag) = tag {
            filter.push(format!("tag {}", tag.as_str()));
        }
        if filter.is_empty() {
            filter.push("empty catalogue".to_string());
        }
        return Err(E2eError::NoScenariosSelected(filter.join(", ")));
    }
    Ok(selected)
}

/// Every scenario of the suite, fixture driven ones first
pub fn catalogue(fixtures: &FixtureSet) -> Vec<Scenario> {
    let mut scenarios = Vec::new();

    for (i, row) in fixtures.valid_form.iter().enumerate() {
        scenarios.push(fill(
            format!("should_send_valid_form[{}]", i + 1),
            &[Tag::Positive, Tag::Fixture],
            BookingRequest::new(&row.city, row.days, &row.name, &row.phone),
            ValidationOutcome::Accepted,
        ));
    }

    for (i, row) in fixtures.invalid_name.iter().enumerate() {
        scenarios.push(fill(
            format!("should_reject_invalid_name[{}]", i + 1),
            &[Tag::Negative, Tag::Fixture],
            BookingRequest::new(DEFAULT_CITY, row.days, &row.name, &row.phone),
            ValidationOutcome::rejected(Field::Name, messages::NAME_INVALID),
        ));
    }

    for (i, row) in fixtures.invalid_phone.iter().enumerate() {
        scenarios.push(fill(
            format!("should_reject_invalid_phone[{}]", i + 1),
            &[Tag::Negative, Tag::Fixture],
            BookingRequest { phone: row.phone.clone(), ..default_request() },
            ValidationOutcome::rejected(Field::Phone, messages::PHONE_INVALID),
        ));
    }

    for (i, row) in fixtures.invalid_city.iter().enumerate() {
        scenarios.push(fill(
            format!("should_reject_invalid_city[{}]", i + 1),
            &[Tag::Negative, Tag::Fixture],
            BookingRequest { city: row.city.clone(), ..default_request() },
            ValidationOutcome::rejected(Field::City, messages::CITY_UNAVAILABLE),
        ));
    }

    for (i, row) in fixtures.city_search.iter().enumerate() {
        scenarios.push(Scenario {
            name: format!("should_find_city_by_two_letters[{}]", i + 1),
            tags: vec![Tag::Positive, Tag::Widget, Tag::Fixture],
            steps: Steps::CitySearch {
                query: row.query.clone(),
                city: row.city.clone(),
                request: BookingRequest { name: WIDGET_NAME.to_string(), ..default_request() },
            },
            expected: ValidationOutcome::Accepted,
        });
    }

    scenarios.push(fill(
        "should_reject_date_inside_lead_time",
        &[Tag::Negative],
        BookingRequest::new(DEFAULT_CITY, TOO_SOON_DAYS, DEFAULT_NAME, DEFAULT_PHONE),
        ValidationOutcome::rejected(Field::Date, messages::DATE_IMPOSSIBLE),
    ));
    scenarios.push(fill(
        "should_reject_impossible_date",
        &[Tag::Negative],
        default_request().with_date_literal(IMPOSSIBLE_DATE),
        ValidationOutcome::rejected(Field::Date, messages::DATE_INVALID),
    ));
    scenarios.push(fill(
        "should_reject_empty_date",
        &[Tag::Negative],
        default_request().with_date_literal(" "),
        ValidationOutcome::rejected(Field::Date, messages::DATE_INVALID),
    ));
    scenarios.push(fill(
        "should_reject_empty_city",
        &[Tag::Negative],
        BookingRequest { city: String::new(), ..default_request() },
        ValidationOutcome::rejected(Field::City, messages::FIELD_REQUIRED),
    ));
    scenarios.push(fill(
        "should_reject_blank_name",
        &[Tag::Negative],
        BookingRequest { name: "  ".to_string(), ..default_request() },
        ValidationOutcome::rejected(Field::Name, messages::FIELD_REQUIRED),
    ));
    scenarios.push(fill(
        "should_reject_blank_phone",
        &[Tag::Negative],
        BookingRequest { phone: "  ".to_string(), ..default_request() },
        ValidationOutcome::rejected(Field::Phone, messages::FIELD_REQUIRED),
    ));
    scenarios.push(fill(
        "should_block_unchecked_agreement",
        &[Tag::Negative],
        default_request().without_agreement(),
        ValidationOutcome::rejected(Field::Agreement, ""),
    ));
    scenarios.push(Scenario {
        name: "should_pick_date_in_calendar".to_string(),
        tags: vec![Tag::Positive, Tag::Widget],
        steps: Steps::Calendar {
            offset_days: CALENDAR_DAYS,
            request: BookingRequest { name: WIDGET_NAME.to_string(), ..default_request() },
        },
        expected: ValidationOutcome::Accepted,
    });

    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingRules;
    use crate::dates::DateGenerator;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::path::Path;

    fn shipped() -> FixtureSet {
        FixtureSet::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")).unwrap()
    }

    #[test]
    fn test_names_are_unique() {
        let scenarios = catalogue(&shipped());
        let names: HashSet<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn test_fixed_scenarios_without_fixtures() {
        let scenarios = catalogue(&FixtureSet::default());
        assert_eq!(scenarios.len(), 8);
        assert!(scenarios.iter().all(|s| !s.has_tag(Tag::Fixture)));
    }

    #[test]
    fn test_expectations_agree_with_rules() {
        let rules = BookingRules::default();
        for (y, m, d) in [(2026, 10, 19), (2026, 12, 28), (2028, 2, 25)] {
            let today = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let dates = DateGenerator::new(today);
            for scenario in catalogue(&shipped()) {
                assert_eq!(
                    rules.evaluate(&scenario.effective_request(), &dates),
                    scenario.expected,
                    "{} on {:?}",
                    scenario.name,
                    today
                );
            }
        }
    }

    #[test]
    fn test_widget_scenarios_are_tagged() {
        let scenarios = catalogue(&shipped());
        let widgets: Vec<_> = scenarios.iter().filter(|s| s.has_tag(Tag::Widget)).collect();
        assert_eq!(widgets.len(), shipped().city_search.len() + 1);
        assert!(widgets.iter().all(|s| s.expected.is_accepted()));
    }

    #[test]
    fn test_select_everything() {
        let scenarios = catalogue(&shipped());
        assert_eq!(select(&scenarios, None, None).unwrap().len(), scenarios.len());
    }

    #[test]
    fn test_select_by_tag() {
        let scenarios = catalogue(&shipped());
        let negative = select(&scenarios, None, Some(Tag::Negative)).unwrap();
        assert!(!negative.is_empty());
        assert!(negative.iter().all(|s| !s.expected.is_accepted()));
    }

    #[test]
    fn test_select_by_name() {
        let scenarios = catalogue(&shipped());
        let picked = select(&scenarios, Some("should_pick_date_in_calendar"), None).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "should_pick_date_in_calendar");
    }

    #[test]
    fn test_select_unknown_name_fails() {
        let scenarios = catalogue(&shipped());
        let typo = "should_pick_date_in_calender";
        let err = select(&scenarios, Some(typo), None).unwrap_err();
        assert!(matches!(err, E2eError::ScenarioNotFound(name) if name == typo));
    }

    #[test]
    fn test_select_nothing_fails() {
        let fixed_only = catalogue(&FixtureSet::default());
        let err = select(&fixed_only, None, Some(Tag::Fixture)).unwrap_err();
        assert!(matches!(err, E2eError::NoScenariosSelected(_)));

        let calendar = Some("should_pick_date_in_calendar");
        let err = select(&fixed_only, calendar, Some(Tag::Negative)).unwrap_err();
        assert!(matches!(err, E2eError::NoScenariosSelected(_)));

        let err = select(&[], None, None).unwrap_err();
        assert!(matches!(err, E2eError::NoScenariosSelected(_)));
    }
}
