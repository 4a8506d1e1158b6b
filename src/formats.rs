//! String format recognizers shared by the validator, coercer and inference.
use chrono::{DateTime, FixedOffset, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical wire format for `Date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static UUID_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid regex")
});

static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email regex")
});

// chrono's %Y accepts signed and short years; the wire form is exactly 4-2-2.
static DATE_RX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex"));

pub fn is_uuid(s: &str) -> bool { UUID_RX.is_match(s) }

pub fn is_email(s: &str) -> bool { EMAIL_RX.is_match(s) }

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if !DATE_RX.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// RFC 3339, e.g. `2024-05-01T12:30:00Z` or `2024-05-01T12:30:00+02:00`.
pub fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

pub fn format_date(d: &NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String { dt.to_rfc3339() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_is_canonical_8_4_4_4_12() {
        assert!(is_uuid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_uuid("123E4567-E89B-12D3-A456-426614174000"));
        assert!(!is_uuid("123e4567e89b12d3a456426614174000"));
        assert!(!is_uuid("{123e4567-e89b-12d3-a456-426614174000}"));
        assert!(!is_uuid("123e4567-e89b-12d3-a456-42661417400g"));
    }

    #[test]
    fn email_needs_local_and_domain() {
        assert!(is_email("ada@example.com"));
        assert!(is_email("first.last+tag@mail.example.org"));
        assert!(!is_email("ada@"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ada example.com"));
        assert!(!is_email("ada@localhost"));
    }

    #[test]
    fn dates_are_strict() {
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("2024-2-9").is_none());
        assert!(parse_date("2024-02-29T00:00:00Z").is_none());
    }

    #[test]
    fn datetimes_round_trip_through_rfc3339() {
        let dt = parse_datetime("2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(parse_datetime(&format_datetime(&dt)), Some(dt));
        assert!(parse_datetime("2024-05-01").is_none());
    }
}
