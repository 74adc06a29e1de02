//! Hivelog Core Library
//!
//! Structured, queryable application logging without an external
//! log-aggregation service. Events are written as newline-delimited JSON
//! into a Hive-partitioned directory tree, which any globbing NDJSON
//! reader can treat as a relational table with `date` and `source`
//! columns inferred from the path.
//!
//! ## Architecture
//!
//! ```text
//! <log_root>/
//! ├── date=2026-02-11/
//! │   └── source=web_server/
//! │       └── 1739300021-4321-9f3ac01d.ndjson
//! └── date=2026-02-12/
//!     ├── source=web_server/
//!     │   └── 1739386500-4321-02be77a9.ndjson
//!     └── source=task_worker/
//!         └── 1739386788-5110-c41d22f0.ndjson
//! ```
//!
//! Each process/source pair appends to its own uniquely named file, so
//! concurrent writers need no coordination: safety rests on whole-line
//! appends with immediate flush, not locks. Within one logger the `ts`
//! field is strictly increasing even when the wall clock stalls.
//!
//! ## Emitting
//!
//! ```ignore
//! use hivelog_core::{log_error, log_info, Logger, LoggerConfig};
//!
//! let config = LoggerConfig::new("/tmp/app_logs", "web_server")
//!     .timezone_name("America/Chicago")?;
//! let logger = Logger::new(config)?;
//!
//! log_info!(logger, "listening on port {}", 8080);
//! log_error!(logger, "upstream timed out after {}ms", 250);
//! ```
//!
//! ## Querying
//!
//! ```ignore
//! use hivelog_core::query::{self, QueryFilter};
//!
//! let filter = QueryFilter {
//!     source: Some("web_server".into()),
//!     keyword: Some("timeout".into()),
//!     ..QueryFilter::default()
//! };
//! for record in query::records("/tmp/app_logs".as_ref(), chrono_tz::Tz::UTC, &filter)? {
//!     println!("{} {}", record.ts, record.msg);
//! }
//! ```
//!
//! ## Querying with external tools
//!
//! The layout is plain Hive partitioning, so the same tree also answers
//! to any engine that reads NDJSON globs:
//!
//! ```sql
//! SELECT * FROM read_ndjson('/tmp/app_logs/**/*.ndjson')
//! WHERE date = '2026-02-12' AND level = 'ERROR'
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod layer;
pub mod level;
pub mod logger;
pub mod path;
pub mod query;
pub mod record;
pub mod retention;
pub mod sink;

// Re-exports for convenience
pub use clock::MonotonicClock;
pub use config::{local_date_for, parse_timezone, LoggerConfig};
pub use error::{LogError, LogResult};
pub use layer::PartitionedLayer;
pub use level::Level;
pub use logger::Logger;
pub use query::{PartitionRef, QueryFilter, SourceSummary};
pub use record::{Callsite, LogRecord};
pub use retention::{cutoff_for, sweep, SweepReport};
pub use sink::PartitionedSink;
