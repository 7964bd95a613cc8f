//! CSV fixtures for the parameterized scenarios
//!
//! Every file starts with a header row naming its columns; the header is
//! skipped and each remaining row becomes one test case.

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

pub const VALID_FORM: &str = "valid_form.csv";
pub const INVALID_NAME: &str = "invalid_name.csv";
pub const INVALID_PHONE: &str = "invalid_phone.csv";
pub const INVALID_CITY: &str = "invalid_city.csv";
pub const CITY_SEARCH: &str = "city_search.csv";

/// `city,days,name,phone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRow {
    pub city: String,
    pub days: i64,
    pub name: String,
    pub phone: String,
}

/// `phone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneRow {
    pub phone: String,
}

/// `city`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRow {
    pub city: String,
}

/// `query,city`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySearchRow {
    pub query: String,
    pub city: String,
}

/// All fixture files of the suite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    pub valid_form: Vec<BookingRow>,
    pub invalid_name: Vec<BookingRow>,
    pub invalid_phone: Vec<PhoneRow>,
    pub invalid_city: Vec<CityRow>,
    pub city_search: Vec<CitySearchRow>,
}

impl FixtureSet {
    pub fn load(dir: &Path) -> E2eResult<Self> {
        let set = Self {
            valid_form: read_rows(&dir.join(VALID_FORM))?,
            invalid_name: read_rows(&dir.join(INVALID_NAME))?,
            invalid_phone: read_rows(&dir.join(INVALID_PHONE))?,
            invalid_city: read_rows(&dir.join(INVALID_CITY))?,
            city_search: read_rows(&dir.join(CITY_SEARCH))?,
        };
        debug!(dir = %dir.display(), rows = set.len(), "Loaded fixtures");
        Ok(set)
    }

    /// Total number of rows across all files
    pub fn len(&self) -> usize {
        self.valid_form.len()
            + self.invalid_name.len()
            + self.invalid_phone.len()
            + self.invalid_city.len()
            + self.city_search.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> E2eResult<Vec<T>> {
    let file = std::fs::File::open(path).map_err(|err| E2eError::Fixture {
        file: path.display().to_string(),
        reason: err.to_string(),
    })?;
    parse_rows(file, &path.display().to_string())
}

/// Rows of a CSV document; `origin` names the source in errors
pub fn parse_rows<T, R>(reader: R, origin: &str) -> E2eResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    csv_reader
        .deserialize::<T>()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|err| E2eError::Fixture {
                file: origin.to_string(),
                // +2: one for the header, one for 1-based numbering
                reason: format!("row {}: {}", index + 2, err),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_skipped() {
        let csv = "city,days,name,phone\nМосква,3,Иван Петров,+79012345678\nКазань,10,Анна,+79990001122\n";
        let rows: Vec<BookingRow> = parse_rows(csv.as_bytes(), "inline").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            BookingRow {
                city: "Москва".to_string(),
                days: 3,
                name: "Иван Петров".to_string(),
                phone: "+79012345678".to_string(),
            }
        );
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let csv = "phone\n\"  \"\n+7911\n";
        let rows: Vec<PhoneRow> = parse_rows(csv.as_bytes(), "inline").unwrap();
        assert_eq!(rows[0].phone, "  ");
        assert_eq!(rows[1].phone, "+7911");
    }

    #[test]
    fn test_bad_row_names_its_line() {
        let csv = "city,days,name,phone\nМосква,three,Иван,+79012345678\n";
        let err = parse_rows::<BookingRow, _>(csv.as_bytes(), "valid_form.csv").unwrap_err();
        match err {
            E2eError::Fixture { file, reason } => {
                assert_eq!(file, "valid_form.csv");
                assert!(reason.starts_with("row 2:"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FixtureSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, E2eError::Fixture { .. }));
    }

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            (VALID_FORM, "city,days,name,phone\nМосква,3,Иван,+79012345678\n"),
            (INVALID_NAME, "city,days,name,phone\nМосква,3,Ivan,+79012345678\n"),
            (INVALID_PHONE, "phone\n123\n"),
            (INVALID_CITY, "city\nСочи\n"),
            (CITY_SEARCH, "query,city\nМо,Москва\n"),
        ];
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }

        let set = FixtureSet::load(dir.path()).unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.city_search[0].query, "Мо");
    }

    #[test]
    fn test_shipped_fixtures_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let set = FixtureSet::load(&dir).unwrap();
        assert!(!set.valid_form.is_empty());
        assert!(!set.invalid_name.is_empty());
        assert!(!set.invalid_phone.is_empty());
        assert!(!set.invalid_city.is_empty());
        assert!(!set.city_search.is_empty());
    }
}
