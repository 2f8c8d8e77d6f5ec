use time::{OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

/// `CURRENT_TIMESTAMP` writes this shape, in UTC.
const SQLITE_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const SQLITE_TIMESTAMP_FRACTIONAL: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

pub const UNKNOWN_AGE: &str = "unknown";

pub fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim().replacen('T', " ", 1);
    PrimitiveDateTime::parse(&raw, SQLITE_TIMESTAMP)
        .or_else(|_| PrimitiveDateTime::parse(&raw, SQLITE_TIMESTAMP_FRACTIONAL))
        .ok()
}

/// Buckets elapsed seconds. Negative spans (clock skew) read as "just now".
pub fn format_elapsed(seconds: i64) -> String {
    if seconds < 60 {
        return "just now".to_owned();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} min ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }

    format!("{} days ago", hours / 24)
}

pub fn time_ago(created: Option<PrimitiveDateTime>, now: PrimitiveDateTime) -> String {
    match created {
        Some(created) => format_elapsed((now - created).whole_seconds()),
        None => UNKNOWN_AGE.to_owned(),
    }
}

/// Age of a raw stored timestamp. Missing or unparsable values give "unknown".
pub fn describe(raw: Option<&str>, now: PrimitiveDateTime) -> String {
    time_ago(raw.and_then(parse_timestamp), now)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn buckets() {
        assert_eq!(format_elapsed(0), "just now");
        assert_eq!(format_elapsed(59), "just now");
        assert_eq!(format_elapsed(60), "1 min ago");
        assert_eq!(format_elapsed(3599), "59 min ago");
        assert_eq!(format_elapsed(3600), "1h ago");
        assert_eq!(format_elapsed(86_399), "23h ago");
        assert_eq!(format_elapsed(86_400), "1 days ago");
        assert_eq!(format_elapsed(10 * 86_400 + 5), "10 days ago");
        assert_eq!(format_elapsed(-30), "just now");
    }

    #[test]
    fn parses_sqlite_timestamps() {
        assert_eq!(
            parse_timestamp("2025-03-04 10:11:12"),
            Some(datetime!(2025-03-04 10:11:12))
        );
        assert_eq!(
            parse_timestamp("2025-03-04T10:11:12"),
            Some(datetime!(2025-03-04 10:11:12))
        );
        assert_eq!(
            parse_timestamp("2025-03-04 10:11:12.250"),
            Some(datetime!(2025-03-04 10:11:12.25))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn missing_timestamp_is_unknown() {
        let now = datetime!(2025-03-04 12:00:00);
        assert_eq!(describe(None, now), "unknown");
        assert_eq!(describe(Some("garbage"), now), "unknown");
        assert_eq!(describe(Some("2025-03-04 10:00:00"), now), "2h ago");
    }
}
