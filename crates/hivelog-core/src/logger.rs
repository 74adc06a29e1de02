//! The public-facing log record emitter.
//!
//! A [`Logger`] owns one monotonic clock and one partitioned sink behind a
//! mutex, so a single instance can be shared across threads. `emit` never
//! returns an error and never panics: logging is best-effort
//! instrumentation, not a service whose failure should halt the host.
//!
//! ## Usage
//!
//! ```ignore
//! use hivelog_core::{log_info, Level, Logger, LoggerConfig};
//!
//! let config = LoggerConfig::new("/tmp/app_logs", "web_server")
//!     .timezone_name("America/Chicago")?;
//! let logger = Logger::new(config)?;
//!
//! log_info!(logger, "listening on port {}", 8080);
//! ```

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::DateTime;

use crate::clock::MonotonicClock;
use crate::config::LoggerConfig;
use crate::error::LogError;
use crate::level::Level;
use crate::path::validate_source;
use crate::record::{Callsite, LogRecord};
use crate::sink::PartitionedSink;

/// Structured logging entry point for one source.
#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
    pid: u32,
    inner: Mutex<LoggerInner>,
}

#[derive(Debug)]
struct LoggerInner {
    clock: MonotonicClock,
    sink: PartitionedSink,
}

impl Logger {
    /// Create a logger for `config.source` under `config.log_root`.
    ///
    /// Validates the source name up front; nothing is written to disk
    /// until the first emit.
    pub fn new(config: LoggerConfig) -> Result<Self, LogError> {
        validate_source(&config.source)?;
        let sink = PartitionedSink::new(&config.log_root, &config.source);
        Ok(Self {
            pid: std::process::id(),
            inner: Mutex::new(LoggerInner {
                clock: MonotonicClock::new(),
                sink,
            }),
            config,
        })
    }

    /// Emit one record. Synchronous, infallible from the caller's view.
    ///
    /// Every record reaches the structured sink regardless of level; the
    /// console threshold only gates the human-readable stderr echo.
    pub fn emit(&self, level: Level, msg: impl Into<String>, callsite: Callsite) {
        let msg = msg.into();
        let mut inner = self.lock_inner();

        let ts = inner.clock.allocate();
        let record = LogRecord::new(ts, level, &self.config.source, self.pid, callsite, msg);
        let local_date = self.config.local_date(ts);
        inner.sink.write(&record, local_date);
        drop(inner);

        if let Some(threshold) = self.config.console_level {
            if level >= threshold {
                let local = DateTime::from_timestamp_nanos(record.ts as i64)
                    .with_timezone(&self.config.timezone);
                eprintln!(
                    "{} {:8} [{}] {}:{} {} - {}",
                    local.format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level.as_str(),
                    record.source,
                    record.file,
                    record.line,
                    record.func,
                    record.msg
                );
            }
        }
    }

    /// Close the sink handle, e.g. at process shutdown.
    ///
    /// The logger remains usable; a later emit reopens from scratch.
    pub fn close(&self) {
        self.lock_inner().sink.close();
    }

    /// The source name this logger partitions under.
    pub fn source(&self) -> &str {
        &self.config.source
    }

    /// Path of the sink file currently being appended to, if any.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.lock_inner().sink.current_path().map(PathBuf::from)
    }

    /// Lines dropped due to I/O failures since construction.
    pub fn dropped_lines(&self) -> u64 {
        self.lock_inner().sink.dropped_lines()
    }

    /// Most recent diagnostic message, if any failure occurred.
    pub fn last_error(&self) -> Option<String> {
        self.lock_inner().sink.last_error().map(String::from)
    }

    // A panicking emit path would violate the never-throws contract, so a
    // poisoned mutex is recovered rather than unwrapped.
    fn lock_inner(&self) -> std::sync::MutexGuard<'_, LoggerInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Emit a record at an explicit level, capturing the call site.
#[macro_export]
macro_rules! log_event {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.emit($level, format!($($arg)+), $crate::callsite!())
    };
}

/// Emit a DEBUG record.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_event!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Emit an INFO record.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_event!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Emit a WARNING record.
#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_event!($logger, $crate::Level::Warning, $($arg)+)
    };
}

/// Emit an ERROR record.
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_event!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Emit a CRITICAL record.
#[macro_export]
macro_rules! log_critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_event!($logger, $crate::Level::Critical, $($arg)+)
    };
}
