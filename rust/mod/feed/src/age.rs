//! Human-readable post age ("posted 3 minutes ago").

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 31 * DAY;
const YEAR: i64 = 365 * DAY;

const UNITS: [(i64, &str); 6] = [
    (YEAR, "year"),
    (MONTH, "month"),
    (DAY, "day"),
    (HOUR, "hour"),
    (MINUTE, "minute"),
    (SECOND, "second"),
];

/// Describe how long before `now_ms` a post published at `published_ms` was
/// written, in the largest unit that fits. Anything up to a second, or in
/// the future, reads as one second.
pub fn describe_age(published_ms: i64, now_ms: i64) -> String {
    let gap = now_ms.saturating_sub(published_ms);
    let (count, unit) = UNITS
        .iter()
        .find(|(len, _)| gap > *len)
        .map(|(len, unit)| (gap / len, *unit))
        .unwrap_or((1, "second"));
    let plural = if count == 1 { "" } else { "s" };
    format!("posted {count} {unit}{plural} ago")
}
