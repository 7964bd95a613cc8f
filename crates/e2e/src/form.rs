//! Filling and submitting the booking form

use std::time::Duration;

use tracing::debug;

use crate::booking::{messages, BookingRequest, Field, ValidationOutcome};
use crate::config::TimeoutConfig;
use crate::dates::{DateGenerator, LEAD_TIME_DAYS};
use crate::error::{E2eError, E2eResult};
use crate::page::{Page, TextMatch};
use crate::selectors;
use crate::wait::{wait_until, Condition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// The notification appears after a round trip to the server
    pub notification: Duration,
    pub expectation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        TimeoutConfig::default().into()
    }
}

impl From<TimeoutConfig> for Timeouts {
    fn from(config: TimeoutConfig) -> Self {
        Self {
            notification: config.notification(),
            expectation: config.expectation(),
        }
    }
}

/// The booking form on an already opened page
pub struct CardForm<'p, P: Page + ?Sized> {
    page: &'p mut P,
    dates: DateGenerator,
    timeouts: Timeouts,
}

impl<'p, P: Page + ?Sized> CardForm<'p, P> {
    pub fn new(page: &'p mut P, dates: DateGenerator) -> Self {
        Self {
            page,
            dates,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn dates(&self) -> &DateGenerator {
        &self.dates
    }

    pub fn page(&mut self) -> &mut P {
        &mut *self.page
    }

    pub async fn open(&mut self, url: &str) -> E2eResult<()> {
        self.page.open(url).await
    }

    pub async fn set_city(&mut self, city: &str) -> E2eResult<()> {
        self.page.set_value(selectors::CITY_INPUT, city).await
    }

    /// Type `query` into the city input and pick `city` from the suggestions
    pub async fn choose_city_suggestion(&mut self, query: &str, city: &str) -> E2eResult<()> {
        self.set_city(query).await?;
        self.page
            .click_matching(selectors::CITY_SUGGESTION, TextMatch::Contains(city))
            .await
    }

    /// Replace the prefilled date with `today + offset_days`; returns the
    /// text typed
    pub async fn set_date(&mut self, offset_days: i64) -> E2eResult<String> {
        let date = self.dates.form_date(offset_days)?;
        self.set_date_literal(&date).await?;
        Ok(date)
    }

    pub async fn set_date_literal(&mut self, text: &str) -> E2eResult<()> {
        self.page.replace_value(selectors::DATE_INPUT, text).await
    }

    /// Pick `today + offset_days` in the calendar popup. The calendar opens on
    /// the prefilled date, `today + LEAD_TIME_DAYS`.
    pub async fn pick_date_in_calendar(&mut self, offset_days: i64) -> E2eResult<String> {
        let date = self.dates.form_date(offset_days)?;
        let day = self.dates.day_of_month(offset_days)?.to_string();
        let months_ahead = self.dates.months_between(LEAD_TIME_DAYS, offset_days)?;
        debug!(%date, months_ahead, "picking date in calendar");

        self.page.click(selectors::CALENDAR_TOGGLE).await?;
        for _ in 0..months_ahead {
            self.page.click(selectors::CALENDAR_NEXT_MONTH).await?;
        }
        self.page
            .click_matching(selectors::CALENDAR_DAY, TextMatch::Exact(&day))
            .await?;
        Ok(date)
    }

    pub async fn set_name(&mut self, name: &str) -> E2eResult<()> {
        self.page.set_value(selectors::NAME_INPUT, name).await
    }

    pub async fn set_phone(&mut self, phone: &str) -> E2eResult<()> {
        self.page.set_value(selectors::PHONE_INPUT, phone).await
    }

    pub async fn accept_agreement(&mut self) -> E2eResult<()> {
        self.page.click(selectors::AGREEMENT).await
    }

    pub async fn submit(&mut self) -> E2eResult<()> {
        self.page
            .click_matching(selectors::BUTTON, TextMatch::Exact(selectors::SUBMIT_CAPTION))
            .await
    }

    /// Fill every field from `request` in form order and submit. Returns the
    /// text typed into the date input.
    pub async fn fill_and_submit(&mut self, request: &BookingRequest) -> E2eResult<String> {
        debug!(?request, "filling form");
        let date = request.date_text(&self.dates)?;

        self.set_city(&request.city).await?;
        self.set_date_literal(&date).await?;
        self.set_name(&request.name).await?;
        self.set_phone(&request.phone).await?;
        if request.agreement {
            self.accept_agreement().await?;
        }
        self.submit().await?;
        Ok(date)
    }

    pub async fn expect_success(&mut self, date: &str) -> E2eResult<()> {
        wait_until(
            &mut *self.page,
            selectors::NOTIFICATION,
            &[
                Condition::Visible,
                Condition::ContainsText(date),
                Condition::ContainsText(messages::SUCCESS),
            ],
            self.timeouts.notification,
        )
        .await?;
        Ok(())
    }

    pub async fn expect_field_error(&mut self, field: Field, message: &str) -> E2eResult<()> {
        let mut conditions = vec![Condition::Visible];
        if !message.is_empty() {
            conditions.push(Condition::ContainsText(message));
        }
        wait_until(
            &mut *self.page,
            selectors::invalid_marker(field),
            &conditions,
            self.timeouts.expectation,
        )
        .await?;
        Ok(())
    }

    pub async fn expect_agreement_invalid(&mut self) -> E2eResult<()> {
        self.expect_field_error(Field::Agreement, "").await
    }

    /// The success notification is absent or hidden
    pub async fn expect_not_booked(&mut self) -> E2eResult<()> {
        match self.page.probe(selectors::NOTIFICATION).await? {
            Some(state) if state.visible => Err(E2eError::AssertionFailed {
                selector: selectors::NOTIFICATION.to_string(),
                expected: "absent or hidden".to_string(),
                observed: format!("visible, text {:?}", state.text),
                waited: Duration::ZERO,
            }),
            _ => Ok(()),
        }
    }

    /// Assert `outcome`; `date` is the text the notification must repeat.
    /// A rejection also requires that nothing was booked.
    pub async fn expect_outcome(
        &mut self,
        outcome: &ValidationOutcome,
        date: &str,
    ) -> E2eResult<()> {
        match outcome {
            ValidationOutcome::Accepted => self.expect_success(date).await,
            ValidationOutcome::RejectedField { field, message } => {
                self.expect_field_error(*field, message).await?;
                self.expect_not_booked().await
            }
        }
    }
}
