//! Test result formatting

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

use crate::service::{display_id, LogRow, TestResults};

const SEPARATOR: &str = "-----";

/// Render a unix timestamp as `YYYY-MM-DD HH:MM:SS` in `tz`
///
/// Fractional seconds are truncated. Timestamps chrono cannot represent are
/// printed as the raw number.
pub fn format_timestamp<Tz>(time: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if !time.is_finite() {
        return time.to_string();
    }
    let secs = time.floor();
    let nanos = ((time - secs) * 1_000_000_000.0) as u32;

    DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
        .map(|utc| {
            utc.with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| time.to_string())
}

/// Build the test log block
///
/// ```text
/// test logs:
/// -----
/// 2024-01-01 10:00:00: started
/// -----
/// ```
pub fn format_log_block<Tz>(rows: &[LogRow], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = vec!["test logs:".to_string(), SEPARATOR.to_string()];
    lines.extend(
        rows.iter().map(|row| {
            format!(
                "{}: {}",
                format_timestamp(row.time, tz),
                display_id(&row.message)
            )
        }),
    );
    lines.push(SEPARATOR.to_string());
    lines.join("\n")
}

/// Render the `results` object of a results reply
pub fn format_results(results: &TestResults) -> String {
    match &results.results {
        Some(value) => value.to_string(),
        None => "none".to_string(),
    }
}
