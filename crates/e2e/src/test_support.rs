//! In-memory stand-in for the booking page
//!
//! [`FakeCardApp`] answers the suite's selectors the way the real page does,
//! validating with [`BookingRules`]. It lets the form helper and the whole
//! scenario catalogue run without a browser.

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};

use crate::booking::{
    BookingRequest, BookingRules, DateInput, Field, ValidationOutcome, SUPPORTED_CITIES,
};
use crate::dates::{days_in_month, first_of_month, parse_form_date, DateGenerator, LEAD_TIME_DAYS};
use crate::error::{E2eError, E2eResult};
use crate::page::{ElementState, Page, TextMatch};
use crate::selectors;

/// Suggestions appear once this many characters are typed
const SUGGEST_AFTER_CHARS: usize = 2;

#[derive(Debug, Clone)]
pub struct FakeCardApp {
    dates: DateGenerator,
    rules: BookingRules,
    url: Option<String>,
    city: String,
    date: String,
    name: String,
    phone: String,
    agreement: bool,
    suggestions: Vec<String>,
    /// First day of the month shown while the calendar is open
    calendar: Option<NaiveDate>,
    outcome: Option<ValidationOutcome>,
    submissions: usize,
}

impl FakeCardApp {
    pub fn new(dates: DateGenerator) -> Self {
        Self {
            dates,
            rules: BookingRules::default(),
            url: None,
            city: String::new(),
            date: String::new(),
            name: String::new(),
            phone: String::new(),
            agreement: false,
            suggestions: Vec::new(),
            calendar: None,
            outcome: None,
            submissions: 0,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn agreement(&self) -> bool {
        self.agreement
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        self.outcome.as_ref()
    }

    /// Number of times the submit button was pressed since the last load
    pub fn submissions(&self) -> usize {
        self.submissions
    }

    fn ensure_loaded(&self, selector: &str) -> E2eResult<()> {
        if self.url.is_none() {
            return Err(not_found(selector));
        }
        Ok(())
    }

    fn type_city(&mut self, value: &str) {
        self.city = value.to_string();
        self.suggestions = if value.trim().chars().count() >= SUGGEST_AFTER_CHARS {
            let query = value.trim().to_lowercase();
            SUPPORTED_CITIES
                .iter()
                .filter(|city| city.to_lowercase().contains(&query))
                .map(|city| city.to_string())
                .collect()
        } else {
            Vec::new()
        };
    }

    fn type_into(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        match selector {
            selectors::CITY_INPUT => self.type_city(value),
            selectors::DATE_INPUT => self.date = value.to_string(),
            selectors::NAME_INPUT => self.name = value.to_string(),
            selectors::PHONE_INPUT => self.phone = value.to_string(),
            other => return Err(not_found(other)),
        }
        Ok(())
    }

    fn submit(&mut self) {
        let request = BookingRequest {
            city: self.city.clone(),
            date: DateInput::Literal(self.date.clone()),
            name: self.name.clone(),
            phone: self.phone.clone(),
            agreement: self.agreement,
        };
        self.outcome = Some(self.rules.evaluate(&request, &self.dates));
        self.submissions += 1;
        self.suggestions.clear();
    }

    fn open_calendar(&mut self) -> E2eResult<()> {
        let shown = match parse_form_date(&self.date) {
            Some(date) => date,
            None => self.dates.date(LEAD_TIME_DAYS)?,
        };
        self.calendar = Some(first_of_month(shown));
        Ok(())
    }

    fn pick_day(&mut self, text: TextMatch<'_>) -> E2eResult<()> {
        let Some(month) = self.calendar else {
            return Err(not_found(selectors::CALENDAR_DAY));
        };
        let picked = (1..=days_in_month(month))
            .find(|day| text.matches(&day.to_string()))
            .and_then(|day| month.with_day(day))
            .ok_or_else(|| {
                not_found(&format!("{} with {}", selectors::CALENDAR_DAY, text.describe()))
            })?;

        self.date = picked.format(crate::dates::DATE_PATTERN).to_string();
        self.calendar = None;
        Ok(())
    }

    fn notification(&self) -> ElementState {
        match &self.outcome {
            Some(ValidationOutcome::Accepted) => ElementState::visible(format!(
                "Успешно! Встреча успешно забронирована на {}",
                self.date
            )),
            _ => ElementState::hidden(),
        }
    }

    fn invalid_marker(&self, field: Field) -> Option<ElementState> {
        match &self.outcome {
            Some(ValidationOutcome::RejectedField { field: rejected, message })
                if *rejected == field =>
            {
                let text = format!("{} {}", field_label(field), message);
                Some(ElementState::visible(text.trim()))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Page for FakeCardApp {
    async fn open(&mut self, url: &str) -> E2eResult<()> {
        let prefilled = self.dates.form_date(LEAD_TIME_DAYS)?;
        *self = Self {
            url: Some(url.to_string()),
            date: prefilled,
            ..Self::new(self.dates)
        };
        Ok(())
    }

    async fn set_value(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.ensure_loaded(selector)?;
        self.type_into(selector, value)
    }

    async fn replace_value(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.ensure_loaded(selector)?;
        self.type_into(selector, value)
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.ensure_loaded(selector)?;
        match selector {
            selectors::AGREEMENT => self.agreement = !self.agreement,
            selectors::CALENDAR_TOGGLE => self.open_calendar()?,
            selectors::CALENDAR_NEXT_MONTH => {
                let month = self.calendar.ok_or_else(|| not_found(selector))?;
                self.calendar = month.checked_add_months(Months::new(1));
            }
            other => return Err(not_found(other)),
        }
        Ok(())
    }

    async fn click_matching(&mut self, selector: &str, text: TextMatch<'_>) -> E2eResult<()> {
        self.ensure_loaded(selector)?;
        match selector {
            selectors::BUTTON if text.matches(selectors::SUBMIT_CAPTION) => {
                self.submit();
                Ok(())
            }
            selectors::CITY_SUGGESTION => {
                let city = self
                    .suggestions
                    .iter()
                    .find(|city| text.matches(city))
                    .cloned()
                    .ok_or_else(|| not_found(&format!("{} with {}", selector, text.describe())))?;
                self.city = city;
                self.suggestions.clear();
                Ok(())
            }
            selectors::CALENDAR_DAY => self.pick_day(text),
            other => Err(not_found(&format!("{} with {}", other, text.describe()))),
        }
    }

    async fn probe(&mut self, selector: &str) -> E2eResult<Option<ElementState>> {
        if self.url.is_none() {
            return Ok(None);
        }
        let state = match selector {
            selectors::NOTIFICATION => Some(self.notification()),
            selectors::CITY_SUGGESTION => self.suggestions.first().map(ElementState::visible),
            _ => [Field::City, Field::Date, Field::Name, Field::Phone, Field::Agreement]
                .into_iter()
                .find(|field| selectors::invalid_marker(*field) == selector)
                .and_then(|field| self.invalid_marker(field)),
        };
        Ok(state)
    }

    async fn screenshot(&mut self) -> E2eResult<Vec<u8>> {
        Err(E2eError::Unsupported("screenshots of the in-memory page"))
    }
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::City => "Город",
        Field::Date => "Дата встречи",
        Field::Name => "Фамилия и имя",
        Field::Phone => "Мобильный телефон",
        Field::Agreement => "Я соглашаюсь с условиями обработки и использования моих персональных данных",
    }
}

fn not_found(selector: &str) -> E2eError {
    E2eError::ElementNotFound {
        selector: selector.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> FakeCardApp {
        FakeCardApp::new(DateGenerator::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()))
    }

    #[tokio::test]
    async fn test_open_prefills_date() {
        let mut page = app();
        page.open("http://localhost:9999").await.unwrap();
        assert_eq!(page.date(), "22.10.2026");
        assert_eq!(page.url(), Some("http://localhost:9999"));
    }

    #[tokio::test]
    async fn test_actions_before_open_fail() {
        let mut page = app();
        let err = page.click(selectors::AGREEMENT).await.unwrap_err();
        assert!(matches!(err, E2eError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_unknown_selector_is_not_found() {
        let mut page = app();
        page.open("http://localhost:9999").await.unwrap();
        let err = page.set_value("#missing", "x").await.unwrap_err();
        assert!(matches!(err, E2eError::ElementNotFound { selector } if selector == "#missing"));
    }

    #[tokio::test]
    async fn test_suggestions_need_two_letters() {
        let mut page = app();
        page.open("http://localhost:9999").await.unwrap();

        page.set_value(selectors::CITY_INPUT, "М").await.unwrap();
        assert!(page.suggestions().is_empty());

        page.set_value(selectors::CITY_INPUT, "Мо").await.unwrap();
        assert!(page.suggestions().iter().any(|c| c == "Москва"));
        assert!(page.suggestions().iter().all(|c| c.to_lowercase().contains("мо")));
    }

    #[tokio::test]
    async fn test_calendar_next_month() {
        let mut page = app();
        page.open("http://localhost:9999").await.unwrap();

        page.click(selectors::CALENDAR_TOGGLE).await.unwrap();
        page.click(selectors::CALENDAR_NEXT_MONTH).await.unwrap();
        page.click_matching(selectors::CALENDAR_DAY, TextMatch::Exact("5"))
            .await
            .unwrap();
        assert_eq!(page.date(), "05.11.2026");
    }

    #[tokio::test]
    async fn test_reload_discards_state() {
        let mut page = app();
        page.open("http://localhost:9999").await.unwrap();
        page.set_value(selectors::NAME_INPUT, "Вася").await.unwrap();
        page.click(selectors::AGREEMENT).await.unwrap();

        page.open("http://localhost:9999").await.unwrap();
        assert_eq!(page.name(), "");
        assert!(!page.agreement());
        assert_eq!(page.outcome(), None);
    }
}
