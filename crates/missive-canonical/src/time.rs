use chrono::{DateTime, SecondsFormat, Utc};

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current UTC instant in envelope form.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Returns true when `value` is a UTC instant that re-formats to exactly the
/// same text. Offsets other than `Z`, missing or extra fractional digits and
/// impossible dates all fail.
pub fn is_round_trip_utc(value: &str) -> bool {
    if !value.ends_with('Z') {
        return false;
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => format_timestamp(parsed.with_timezone(&Utc)) == value,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis() {
        let instant = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(format_timestamp(instant), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn round_trip_is_exact() {
        assert!(is_round_trip_utc("2024-01-01T00:00:00.000Z"));
        assert!(!is_round_trip_utc("2024-01-01T00:00:00Z"));
        assert!(!is_round_trip_utc("2024-01-01T00:00:00.000+00:00"));
        assert!(!is_round_trip_utc("2024-02-30T00:00:00.000Z"));
        assert!(!is_round_trip_utc("yesterday"));
    }

    #[test]
    fn now_round_trips() {
        assert!(is_round_trip_utc(&now_timestamp()));
    }
}
