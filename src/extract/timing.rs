//! Duration parsing for test cases and result documents

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// An ISO-8601 timestamp, with or without a UTC offset.
///
/// Differences are only defined between two timestamps of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

impl Timestamp {
    /// Parse an ISO-8601 timestamp. A trailing `Z` is read as `+00:00`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Timestamp::Zoned(dt));
        }

        let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
            Some(stripped) => format!("{}+00:00", stripped),
            None => raw.to_string(),
        };

        for format in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
                return Some(Timestamp::Zoned(dt));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
                return Some(Timestamp::Local(dt));
            }
        }

        NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Timestamp::Local)
    }

    /// `end - self`, or `None` when one side carries an offset and the other does not
    pub fn until(&self, end: &Timestamp) -> Option<Duration> {
        match (self, end) {
            (Timestamp::Zoned(start), Timestamp::Zoned(end)) => Some(*end - *start),
            (Timestamp::Local(start), Timestamp::Local(end)) => Some(*end - *start),
            _ => None,
        }
    }
}

/// Whole seconds a test case ran for.
///
/// Prefers the start/end timestamps, then the numeric execution-time value.
/// Anything unparseable yields 0; negative results are clamped to 0.
pub fn test_duration_seconds(
    start: Option<&str>,
    end: Option<&str>,
    execution_time: Option<&str>,
) -> u64 {
    if let (Some(start), Some(end)) = (start, end) {
        if let Some(elapsed) = Timestamp::parse(start)
            .zip(Timestamp::parse(end))
            .and_then(|(start, end)| start.until(&end))
        {
            return elapsed.num_seconds().max(0) as u64;
        }
    }

    execution_time.and_then(parse_seconds).map(|s| s as u64).unwrap_or(0)
}

/// Non-negative finite number of seconds, truncated toward zero
fn parse_seconds(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.max(0.0).trunc())
}

/// Parse a document-level duration: `H:M:S` or a bare number of seconds.
///
/// Returns `None` for anything else, including negative and out-of-range values.
pub fn parse_document_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();

    if raw.contains(':') {
        let mut parts = raw.split(':').map(str::trim);
        let hours: i64 = parts.next()?.parse().ok()?;
        let minutes: i64 = parts.next()?.parse().ok()?;
        let seconds: f64 = parts.next()?.parse().ok()?;
        if hours < 0 || minutes < 0 || !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        if seconds >= i64::MAX as f64 {
            return None;
        }
        return Duration::try_hours(hours)?
            .checked_add(&Duration::try_minutes(minutes)?)?
            .checked_add(&Duration::try_seconds(seconds as i64)?);
    }

    let seconds: f64 = raw.parse().ok()?;
    let micros = (seconds * 1_000_000.0).round();
    if !micros.is_finite() || micros < 0.0 || micros >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}
