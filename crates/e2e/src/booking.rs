//! Booking requests and the validation rules the form enforces
//!
//! [`BookingRules::evaluate`] predicts what the application answers for a
//! request. Scenarios declare their expected outcome explicitly; the rules
//! keep those declarations honest.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dates::{parse_form_date, DateGenerator, LEAD_TIME_DAYS};
use crate::error::E2eResult;

/// Literal texts rendered by the application
pub mod messages {
    pub const FIELD_REQUIRED: &str = "Поле обязательно для заполнения";
    pub const CITY_UNAVAILABLE: &str = "Доставка в выбранный город недоступна";
    pub const DATE_IMPOSSIBLE: &str = "Заказ на выбранную дату невозможен";
    pub const DATE_INVALID: &str = "Неверно введена дата";
    pub const NAME_INVALID: &str =
        "Имя и Фамилия указаные неверно. Допустимы только русские буквы, пробелы и дефисы.";
    pub const PHONE_INVALID: &str =
        "Телефон указан неверно. Должно быть 11 цифр, например, +79012345678";
    pub const SUCCESS: &str = "Успешно";
}

/// Regional administrative centres the service delivers to
pub const SUPPORTED_CITIES: &[&str] = &[
    "Абакан", "Анадырь", "Архангельск", "Астрахань", "Барнаул", "Белгород",
    "Биробиджан", "Благовещенск", "Брянск", "Великий Новгород", "Владивосток",
    "Владикавказ", "Владимир", "Волгоград", "Вологда", "Воронеж", "Горно-Алтайск",
    "Грозный", "Екатеринбург", "Иваново", "Ижевск", "Иркутск", "Йошкар-Ола",
    "Казань", "Калининград", "Калуга", "Кемерово", "Киров", "Кострома",
    "Краснодар", "Красноярск", "Курган", "Курск", "Кызыл", "Липецк", "Магадан",
    "Магас", "Майкоп", "Махачкала", "Москва", "Мурманск", "Нальчик",
    "Нарьян-Мар", "Нижний Новгород", "Новосибирск", "Омск", "Орёл", "Оренбург",
    "Пенза", "Пермь", "Петрозаводск", "Петропавловск-Камчатский", "Псков",
    "Ростов-на-Дону", "Рязань", "Салехард", "Самара", "Санкт-Петербург",
    "Саранск", "Саратов", "Севастополь", "Симферополь", "Смоленск", "Ставрополь",
    "Сыктывкар", "Тамбов", "Тверь", "Томск", "Тула", "Тюмень", "Улан-Удэ",
    "Ульяновск", "Уфа", "Хабаровск", "Ханты-Мансийск", "Чебоксары", "Челябинск",
    "Черкесск", "Чита", "Элиста", "Южно-Сахалинск", "Якутск", "Ярославль",
];

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-Яа-яЁё\s-]+$").expect("name pattern is valid"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+7[0-9]{10}$").expect("phone pattern is valid"));

/// A form field that can carry its own validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    City,
    Date,
    Name,
    Phone,
    Agreement,
}

impl Field {
    /// Value of the field's `data-test-id` attribute
    pub fn test_id(&self) -> &'static str {
        match self {
            Field::City => "city",
            Field::Date => "date",
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Agreement => "agreement",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.test_id())
    }
}

/// What ends up in the date input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateInput {
    /// Days from today, rendered with the form's pattern
    Offset(i64),
    /// Typed verbatim, for malformed or blank dates
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub city: String,
    pub date: DateInput,
    pub name: String,
    pub phone: String,
    pub agreement: bool,
}

impl BookingRequest {
    pub fn new(
        city: impl Into<String>,
        offset_days: i64,
        name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            date: DateInput::Offset(offset_days),
            name: name.into(),
            phone: phone.into(),
            agreement: true,
        }
    }

    pub fn with_date_literal(mut self, literal: impl Into<String>) -> Self {
        self.date = DateInput::Literal(literal.into());
        self
    }

    pub fn without_agreement(mut self) -> Self {
        self.agreement = false;
        self
    }

    pub fn offset_days(&self) -> Option<i64> {
        match self.date {
            DateInput::Offset(days) => Some(days),
            DateInput::Literal(_) => None,
        }
    }

    /// Text typed into the date input
    pub fn date_text(&self, dates: &DateGenerator) -> E2eResult<String> {
        match &self.date {
            DateInput::Offset(days) => dates.form_date(*days),
            DateInput::Literal(text) => Ok(text.clone()),
        }
    }
}

/// Result of submitting the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted,
    RejectedField { field: Field, message: String },
}

impl ValidationOutcome {
    pub fn rejected(field: Field, message: &str) -> Self {
        ValidationOutcome::RejectedField {
            field,
            message: message.to_string(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Accepted => f.write_str("accepted"),
            ValidationOutcome::RejectedField { field, message } if message.is_empty() => {
                write!(f, "{} marked invalid", field)
            }
            ValidationOutcome::RejectedField { field, message } => {
                write!(f, "{} rejected: {}", field, message)
            }
        }
    }
}

/// Validation rules of the booking form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRules {
    pub lead_time_days: i64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            lead_time_days: LEAD_TIME_DAYS,
        }
    }
}

impl BookingRules {
    /// Outcome of submitting `request`. Fields are checked in form order and
    /// only the first failing one is reported.
    pub fn evaluate(&self, request: &BookingRequest, dates: &DateGenerator) -> ValidationOutcome {
        let date_text = match request.date_text(dates) {
            Ok(text) => text,
            Err(_) => return ValidationOutcome::rejected(Field::Date, messages::DATE_INVALID),
        };

        let checks = [
            (Field::City, check_city(&request.city)),
            (Field::Date, self.check_date(&date_text, dates)),
            (Field::Name, check_name(&request.name)),
            (Field::Phone, check_phone(&request.phone)),
        ];
        if let Some((field, message)) = checks
            .into_iter()
            .find_map(|(field, check)| check.err().map(|message| (field, message)))
        {
            return ValidationOutcome::rejected(field, message);
        }

        if !request.agreement {
            return ValidationOutcome::rejected(Field::Agreement, "");
        }
        ValidationOutcome::Accepted
    }

    pub fn check_date(&self, text: &str, dates: &DateGenerator) -> Result<(), &'static str> {
        let Some(date) = parse_form_date(text) else {
            return Err(messages::DATE_INVALID);
        };
        match dates.date(self.lead_time_days) {
            Ok(earliest) if date >= earliest => Ok(()),
            _ => Err(messages::DATE_IMPOSSIBLE),
        }
    }
}

pub fn is_supported_city(city: &str) -> bool {
    let wanted = city.trim().to_lowercase();
    SUPPORTED_CITIES
        .iter()
        .any(|candidate| candidate.to_lowercase() == wanted)
}

pub fn check_city(city: &str) -> Result<(), &'static str> {
    if city.trim().is_empty() {
        Err(messages::FIELD_REQUIRED)
    } else if !is_supported_city(city) {
        Err(messages::CITY_UNAVAILABLE)
    } else {
        Ok(())
    }
}

pub fn check_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        Err(messages::FIELD_REQUIRED)
    } else if !NAME_PATTERN.is_match(name.trim()) {
        Err(messages::NAME_INVALID)
    } else {
        Ok(())
    }
}

pub fn check_phone(phone: &str) -> Result<(), &'static str> {
    if phone.trim().is_empty() {
        Err(messages::FIELD_REQUIRED)
    } else if !PHONE_PATTERN.is_match(phone.trim()) {
        Err(messages::PHONE_INVALID)
    } else {
        Ok(())
    }
}
