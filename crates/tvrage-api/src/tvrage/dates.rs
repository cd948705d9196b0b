//! Date formats used by the feeds.
//!
//! The API mixes two incompatible date spellings: show-level and countdown
//! dates look like `Jan/05/2020`, episode-level dates like `2020-01-05`.
//! The full schedule splits a timestamp across a day attribute and a
//! 12-hour clock attribute.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Show-level and countdown date format (`Jan/05/2020`).
pub const SHOW_DATE_FORMAT: &str = "%b/%d/%Y";

/// Episode-level date format (`2020-01-05`).
pub const EPISODE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Full-schedule timestamp format (day plus 12-hour clock).
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Parses a show-level date, yielding `None` when the value does not match.
#[must_use]
pub fn parse_show_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, SHOW_DATE_FORMAT).ok()
}

/// Parses an episode-level date, yielding `None` when the value does not match.
#[must_use]
pub fn parse_episode_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, EPISODE_DATE_FORMAT).ok()
}

/// Combines a schedule day attribute and clock attribute into one timestamp.
///
/// # Errors
///
/// Returns an error if the combined value does not match [`SCHEDULE_FORMAT`].
pub fn parse_schedule_datetime(day: &str, time: &str) -> Result<NaiveDateTime> {
    let combined = format!("{day} {time}");
    NaiveDateTime::parse_from_str(&combined, SCHEDULE_FORMAT)
        .with_context(|| format!("invalid schedule timestamp: {combined:?}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_show_date() {
        // Arrange & Act
        let date = parse_show_date("Jan/05/2020").unwrap();

        // Assert
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 5).unwrap());
    }

    #[test]
    fn test_parse_episode_date() {
        // Arrange & Act
        let date = parse_episode_date("2020-01-05").unwrap();

        // Assert: same calendar date as the show-level spelling
        assert_eq!(date, parse_show_date("Jan/05/2020").unwrap());
    }

    #[test]
    fn test_parse_show_date_invalid_is_none() {
        // Arrange & Act & Assert
        assert_eq!(parse_show_date("not-a-date"), None);
        assert_eq!(parse_show_date("2020-01-05"), None);
    }

    #[test]
    fn test_parse_episode_date_invalid_is_none() {
        // Arrange & Act & Assert
        assert_eq!(parse_episode_date("not-a-date"), None);
        assert_eq!(parse_episode_date("Jan/05/2020"), None);
    }

    #[test]
    fn test_parse_schedule_datetime() {
        // Arrange & Act
        let at = parse_schedule_datetime("2020-01-05", "8:00 PM").unwrap();

        // Assert
        assert_eq!(
            at,
            NaiveDate::from_ymd_opt(2020, 1, 5)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_schedule_datetime_morning() {
        // Arrange & Act
        let at = parse_schedule_datetime("2020-01-05", "11:30 AM").unwrap();

        // Assert
        assert_eq!(
            at,
            NaiveDate::from_ymd_opt(2020, 1, 5)
                .unwrap()
                .and_hms_opt(11, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_schedule_datetime_invalid_is_error() {
        // Arrange & Act
        let result = parse_schedule_datetime("2020-01-05", "late");

        // Assert
        assert!(result.is_err());
    }
}
