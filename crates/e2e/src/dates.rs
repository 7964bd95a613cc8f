//! Date generation relative to a fixed "today"
//!
//! A [`DateGenerator`] captures the reference day once, so the value typed
//! into the form and the value expected in the notification are computed
//! from the same day even when a scenario runs across midnight.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Days, Local, Months, NaiveDate};

use crate::error::{E2eError, E2eResult};

/// Pattern used by the booking form's date input (`dd.MM.yyyy`)
pub const DATE_PATTERN: &str = "%d.%m.%Y";

/// Minimum number of days between today and a bookable date
pub const LEAD_TIME_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateGenerator {
    today: NaiveDate,
}

impl DateGenerator {
    /// Generator anchored at the local calendar day
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Calendar date `offset_days` away from the reference day
    pub fn date(&self, offset_days: i64) -> E2eResult<NaiveDate> {
        let shifted = if offset_days >= 0 {
            self.today.checked_add_days(Days::new(offset_days.unsigned_abs()))
        } else {
            self.today.checked_sub_days(Days::new(offset_days.unsigned_abs()))
        };
        shifted.ok_or(E2eError::DateOutOfRange(offset_days))
    }

    /// Render `today + offset_days` with a strftime `pattern`
    pub fn generate(&self, offset_days: i64, pattern: &str) -> E2eResult<String> {
        let items = parse_pattern(pattern)?;
        let date = self.date(offset_days)?;

        // Time fields cannot be rendered from a date; chrono reports that as a
        // formatting error rather than at parse time.
        let mut rendered = String::new();
        write!(rendered, "{}", date.format_with_items(items.iter()))
            .map_err(|_| E2eError::DatePattern(pattern.to_string()))?;
        Ok(rendered)
    }

    /// Shorthand for [`generate`](Self::generate) with [`DATE_PATTERN`]
    pub fn form_date(&self, offset_days: i64) -> E2eResult<String> {
        self.generate(offset_days, DATE_PATTERN)
    }

    pub fn day_of_month(&self, offset_days: i64) -> E2eResult<u32> {
        Ok(self.date(offset_days)?.day())
    }

    /// Number of month steps from the month of `from_offset` to the month of
    /// `to_offset`. Zero when the target is in the same or an earlier month.
    pub fn months_between(&self, from_offset: i64, to_offset: i64) -> E2eResult<u32> {
        let from = month_index(self.date(from_offset)?);
        let to = month_index(self.date(to_offset)?);
        Ok(u32::try_from(to - from).unwrap_or(0))
    }
}

/// Parse a date typed in the form's pattern. `None` for impossible dates
/// such as `31.02.2145`.
pub fn parse_form_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_PATTERN).ok()
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn parse_pattern(pattern: &str) -> E2eResult<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(E2eError::DatePattern(pattern.to_string()));
    }
    Ok(items)
}
