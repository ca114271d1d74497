//! April–March financial year.

use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use billkit_core::{DomainError, ValueObject};

/// A financial year on the April–March fiscal calendar.
///
/// Held as the calendar year the fiscal year starts in; displayed and
/// persisted as the label `"{Y}-{(Y+1) mod 100}"`, e.g. `2024-25` for the
/// year running 2024-04-01 through 2025-03-31.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FinancialYear {
    start_year: i32,
}

impl FinancialYear {
    /// Financial year a date falls in: April onwards belongs to the year
    /// starting in that calendar year, January–March to the previous one.
    pub fn from_date(date: NaiveDate) -> Self {
        let year = if date.month() >= 4 {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start_year: year }
    }

    pub fn starting_in(start_year: i32) -> Self {
        Self { start_year }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// The `"YYYY-YY"` label form, e.g. `"2024-25"`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl ValueObject for FinancialYear {}

impl core::fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

impl FromStr for FinancialYear {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| DomainError::validation(format!("not a financial year label: {s}")))?;
        let start_year: i32 = start
            .parse()
            .map_err(|_| DomainError::validation(format!("bad start year in label: {s}")))?;
        if end.len() != 2 {
            return Err(DomainError::validation(format!(
                "end year must be two digits: {s}"
            )));
        }
        let end_year: i32 = end
            .parse()
            .map_err(|_| DomainError::validation(format!("bad end year in label: {s}")))?;
        if end_year != (start_year + 1).rem_euclid(100) {
            return Err(DomainError::validation(format!(
                "end year does not follow start year: {s}"
            )));
        }
        Ok(Self { start_year })
    }
}

impl TryFrom<String> for FinancialYear {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FinancialYear> for String {
    fn from(year: FinancialYear) -> Self {
        year.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn march_belongs_to_previous_year() {
        assert_eq!(FinancialYear::from_date(date(2024, 3, 15)).label(), "2023-24");
    }

    #[test]
    fn april_first_starts_new_year() {
        assert_eq!(FinancialYear::from_date(date(2024, 4, 1)).label(), "2024-25");
    }

    #[test]
    fn december_belongs_to_current_year() {
        assert_eq!(FinancialYear::from_date(date(2024, 12, 31)).label(), "2024-25");
    }

    #[test]
    fn century_rollover_label() {
        assert_eq!(FinancialYear::starting_in(2099).label(), "2099-00");
    }

    #[test]
    fn label_parses_back() {
        let year: FinancialYear = "2024-25".parse().unwrap();
        assert_eq!(year, FinancialYear::starting_in(2024));
    }

    #[test]
    fn rejects_mismatched_end_year() {
        assert!("2024-26".parse::<FinancialYear>().is_err());
        assert!("2024-2025".parse::<FinancialYear>().is_err());
        assert!("garbage".parse::<FinancialYear>().is_err());
    }

    #[test]
    fn serde_uses_label_form() {
        let json = serde_json::to_string(&FinancialYear::starting_in(2024)).unwrap();
        assert_eq!(json, "\"2024-25\"");
        let back: FinancialYear = serde_json::from_str("\"2023-24\"").unwrap();
        assert_eq!(back, FinancialYear::starting_in(2023));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the label round-trips through `FromStr` and April is the
        /// pivot month for any in-range date.
        #[test]
        fn label_round_trips_for_any_date(
            year in 1990i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
        ) {
            let year_of = FinancialYear::from_date(date(year, month, day));
            let expected_start = if month >= 4 { year } else { year - 1 };
            prop_assert_eq!(year_of.start_year(), expected_start);

            let parsed: FinancialYear = year_of.label().parse().unwrap();
            prop_assert_eq!(parsed, year_of);
        }
    }
}
