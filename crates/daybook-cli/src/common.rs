//! Shared argument parsing helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a user-supplied timestamp.
///
/// Accepts RFC3339 (`2026-08-07T18:00:00Z`), `YYYY-MM-DD HH:MM`, or a
/// bare `YYYY-MM-DD` (interpreted as midnight UTC).
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is valid");
        return Ok(Utc.from_utc_datetime(&midnight));
    }
    Err(format!(
        "cannot parse '{s}' as a timestamp (expected RFC3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_rfc3339() {
        let dt = parse_datetime("2026-08-07T18:30:00Z").unwrap();
        assert_eq!(dt.hour(), 18);
    }

    #[test]
    fn parses_date_and_minutes() {
        let dt = parse_datetime("2026-08-07 09:15").unwrap();
        assert_eq!(dt.minute(), 15);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let dt = parse_datetime("2026-08-07").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_datetime("next tuesday").is_err());
    }
}
