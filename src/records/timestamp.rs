use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a call-record timestamp as returned by the API.
///
/// The primary form is `"M/D/YYYY, HH:MM:SS"` (comma-separated, local time,
/// seconds optional). Anything else is handed to the generic chrono parsers.
/// Invalid input (non-numeric components, out-of-range values) yields None;
/// callers treat None as "exclude from date-filtered views".
pub fn parse_api_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some((date_part, time_part)) = raw.split_once(", ") {
        let mut date_it = date_part.split('/');
        let month: u32 = date_it.next()?.parse().ok()?;
        let day: u32 = date_it.next()?.parse().ok()?;
        let year: i32 = date_it.next()?.parse().ok()?;
        if date_it.next().is_some() {
            return None;
        }

        let mut time_it = time_part.split(':');
        let hour: u32 = time_it.next()?.parse().ok()?;
        let minute: u32 = time_it.next()?.parse().ok()?;
        let second: u32 = match time_it.next() {
            Some(s) => s.parse().ok()?,
            None => 0,
        };

        return NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second);
    }

    // Fallback for ISO-8601 and similar forms.
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok())
}

/// Parse a user-entered filter date (`YYYY-MM-DD`) with an optional
/// `HH:MM` or `HH:MM:SS` time string. Missing time components default to
/// midnight.
pub fn parse_filter_date(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let mut it = date.split('-');
    let year: i32 = it.next()?.parse().ok()?;
    let month: u32 = it.next()?.parse().ok()?;
    let day: u32 = it.next()?.parse().ok()?;
    if it.next().is_some() {
        return None;
    }

    let (hour, minute, second) = match time.filter(|t| !t.is_empty()) {
        Some(t) => {
            let mut parts = t.split(':');
            let h: u32 = parts.next()?.parse().ok()?;
            let m: u32 = parts.next()?.parse().ok()?;
            let s: u32 = match parts.next() {
                Some(s) => s.parse().ok()?,
                None => 0,
            };
            (h, m, s)
        }
        None => (0, 0, 0),
    };

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Last representable second of the given filter date.
pub fn end_of_day(date: &str) -> Option<NaiveDateTime> {
    parse_filter_date(date, Some("23:59:59"))
}

/// Minutes elapsed since the start of the instant's day.
pub fn minutes_from_start_of_day(ts: NaiveDateTime) -> u32 {
    use chrono::Timelike;
    ts.hour() * 60 + ts.minute()
}
