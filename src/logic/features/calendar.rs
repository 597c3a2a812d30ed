//! Calendar Feature Derivation
//!
//! Splits the incident date into the year/month/weekday features the
//! schema names. A date that fails to parse degrades to fixed defaults
//! instead of failing the record; the caller counts the fallback.

use chrono::{Datelike, NaiveDate};

use crate::constants::{FALLBACK_MONTH, FALLBACK_WEEKDAY, FALLBACK_YEAR};

/// Calendar features for one incident date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFeatures {
    pub year: f64,
    pub month: f64,
    /// 0 = Monday .. 6 = Sunday, the encoding the models were trained with
    pub weekday: f64,
    /// True when the date failed to parse and the defaults were used
    pub fell_back: bool,
}

/// Decompose a "YYYY-MM-DD" date string.
pub fn calendar_features(fecha: &str) -> CalendarFeatures {
    match NaiveDate::parse_from_str(fecha.trim(), "%Y-%m-%d") {
        Ok(d) => CalendarFeatures {
            year: f64::from(d.year()),
            month: f64::from(d.month()),
            weekday: f64::from(d.weekday().num_days_from_monday()),
            fell_back: false,
        },
        Err(_) => CalendarFeatures {
            year: FALLBACK_YEAR,
            month: FALLBACK_MONTH,
            weekday: FALLBACK_WEEKDAY,
            fell_back: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_date_decomposes() {
        // 2021-06-15 was a Tuesday
        let cal = calendar_features("2021-06-15");
        assert!(!cal.fell_back);
        assert_eq!(cal.year, 2021.0);
        assert_eq!(cal.month, 6.0);
        assert_eq!(cal.weekday, 1.0);
    }

    #[test]
    fn test_monday_is_zero() {
        // 2021-01-04 was a Monday
        let cal = calendar_features("2021-01-04");
        assert_eq!(cal.weekday, 0.0);
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        let cal = calendar_features(" 2022-12-31 ");
        assert!(!cal.fell_back);
        assert_eq!(cal.year, 2022.0);
    }

    #[test]
    fn test_unparseable_date_falls_back() {
        for bad in ["", "no-es-fecha", "15/06/2021", "2021-13-40"] {
            let cal = calendar_features(bad);
            assert!(cal.fell_back, "expected fallback for {bad:?}");
            assert_eq!(cal.year, FALLBACK_YEAR);
            assert_eq!(cal.month, FALLBACK_MONTH);
            assert_eq!(cal.weekday, FALLBACK_WEEKDAY);
        }
    }
}
