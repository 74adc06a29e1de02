//! Logger configuration.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::error::LogError;
use crate::level::Level;

/// Configuration for one [`crate::Logger`] instance.
///
/// `timezone` governs only the partition-date computation, so log rollover
/// aligns with the operator's local day boundary. The stored `ts` is always
/// UTC epoch nanoseconds regardless of this setting.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Base directory of the partition tree. Must be writable.
    pub log_root: PathBuf,

    /// Component name, fixed at logger construction time.
    pub source: String,

    /// IANA zone for partition dates (default UTC).
    pub timezone: Tz,

    /// Threshold for the human-readable stderr echo; `None` disables it.
    /// The structured file sink always receives every level.
    pub console_level: Option<Level>,
}

impl LoggerConfig {
    pub fn new(log_root: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            log_root: log_root.into(),
            source: source.into(),
            timezone: Tz::UTC,
            console_level: None,
        }
    }

    /// Set the partition timezone.
    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Set the partition timezone from an IANA name (e.g. "America/Chicago").
    pub fn timezone_name(mut self, name: &str) -> Result<Self, LogError> {
        self.timezone = parse_timezone(name)?;
        Ok(self)
    }

    /// Enable the stderr echo for records at `level` and above.
    pub fn console_level(mut self, level: Level) -> Self {
        self.console_level = Some(level);
        self
    }

    /// Disable the stderr echo (only write structured files).
    pub fn no_console(mut self) -> Self {
        self.console_level = None;
        self
    }

    /// Calendar date of `ts_ns` in this config's timezone.
    pub(crate) fn local_date(&self, ts_ns: u64) -> NaiveDate {
        local_date_for(ts_ns, self.timezone)
    }
}

/// Resolve an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, LogError> {
    Tz::from_str(name).map_err(|_| LogError::UnknownTimezone(name.to_string()))
}

/// Calendar date of a UTC nanosecond epoch value in `tz`.
pub fn local_date_for(ts_ns: u64, tz: Tz) -> NaiveDate {
    DateTime::from_timestamp_nanos(ts_ns as i64)
        .with_timezone(&tz)
        .date_naive()
}
