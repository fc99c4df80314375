//! Timestamp formatting for job listings.

use chrono::{DateTime, Local, TimeZone};

/// Render `date` as `M/D/YYYY, h:mm:ss AM`: unpadded month, day and hour on a
/// 12-hour clock (midnight and noon are `12`), zero-padded minutes and seconds.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Render a Hacker News timestamp (Unix seconds) in local time.
///
/// Out-of-range timestamps fall back to the raw number.
pub fn format_unix_time(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(date) => format_date(&date),
        None => secs.to_string(),
    }
}
