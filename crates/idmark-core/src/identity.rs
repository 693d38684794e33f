//! Identity watermark lines: name, department and an optional timestamp

use chrono::{DateTime, FixedOffset, Utc};

/// Offset of the timestamp zone from UTC (UTC+07:00)
pub const TIMESTAMP_UTC_OFFSET_SECONDS: i32 = 7 * 3600;

/// `DD/MM/YYYY HH:MM:SS`
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Format an instant in the fixed watermark zone
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(TIMESTAMP_UTC_OFFSET_SECONDS) {
        Some(zone) => instant
            .with_timezone(&zone)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        None => instant.format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Lines for an identity watermark, stamped with the current time if asked
pub fn compose_user_watermark(
    full_name: &str,
    department: &str,
    include_timestamp: bool,
) -> Vec<String> {
    compose_user_watermark_at(full_name, department, include_timestamp.then(Utc::now))
}

/// Lines for an identity watermark with an explicit timestamp
pub fn compose_user_watermark_at(
    full_name: &str,
    department: &str,
    timestamp: Option<DateTime<Utc>>,
) -> Vec<String> {
    let mut lines = vec![full_name.to_string(), department.to_string()];
    if let Some(instant) = timestamp {
        lines.push(format_timestamp(instant));
    }
    lines
}
