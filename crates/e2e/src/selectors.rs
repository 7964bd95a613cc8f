//! CSS selectors and captions of the booking page

use crate::booking::Field;

pub const CITY_INPUT: &str = "[data-test-id=city] input";
pub const DATE_INPUT: &str = "[data-test-id=date] input";
pub const NAME_INPUT: &str = "[data-test-id=name] input";
pub const PHONE_INPUT: &str = "[data-test-id=phone] input";
pub const AGREEMENT: &str = "[data-test-id=agreement]";
pub const NOTIFICATION: &str = "[data-test-id=notification]";
pub const BUTTON: &str = "button";

pub const CITY_SUGGESTION: &str = "div.popup div.menu-item";

pub const CALENDAR_TOGGLE: &str = "[data-test-id=date] button";
pub const CALENDAR_NEXT_MONTH: &str = "div[data-step='1']";
pub const CALENDAR_DAY: &str = "td.calendar__day";

/// Caption of the submit button
pub const SUBMIT_CAPTION: &str = "Забронировать";

/// Element flagged with `input_invalid` when `field` fails validation.
///
/// The date widget nests the flagged span inside the element carrying the
/// test id; every other field carries the class itself. Matching on the
/// flagged element's whole text works whether or not the message is held in
/// a separate sub element.
pub fn invalid_marker(field: Field) -> &'static str {
    match field {
        Field::City => "[data-test-id=city].input_invalid",
        Field::Date => "[data-test-id=date] .input_invalid",
        Field::Name => "[data-test-id=name].input_invalid",
        Field::Phone => "[data-test-id=phone].input_invalid",
        Field::Agreement => "[data-test-id=agreement].input_invalid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_scoped_to_their_field() {
        for field in [Field::City, Field::Date, Field::Name, Field::Phone, Field::Agreement] {
            let marker = invalid_marker(field);
            assert!(marker.contains(&format!("[data-test-id={}]", field.test_id())));
            assert!(marker.ends_with(".input_invalid"));
        }
    }
}
