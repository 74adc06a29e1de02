//! Partitioned NDJSON file sink.
//!
//! One sink owns one open append-only handle per calendar day. Files are
//! never shared between processes: every open event creates a fresh,
//! collision-free file name, so concurrent writers against the same log
//! root need no locks. Each write is flushed before returning, which keeps
//! whole-line appends atomic for readers that tail the partition tree.
//!
//! Logging must never crash the host application: open and write failures
//! are reported to the diagnostic channel (stderr) and the affected line
//! is dropped. The next write starts over from the closed state.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::clock::wall_clock_ns;
use crate::path::{partition_dir, sink_file_name};
use crate::record::LogRecord;

/// Appends records to the partition for the current local date,
/// rolling over to a new file when the date changes.
#[derive(Debug)]
pub struct PartitionedSink {
    log_root: PathBuf,
    source: String,
    state: SinkState,
    dropped: u64,
    last_error: Option<String>,
}

#[derive(Debug)]
enum SinkState {
    Closed,
    Open(OpenPartition),
}

#[derive(Debug)]
struct OpenPartition {
    date: NaiveDate,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl OpenPartition {
    fn create(log_root: &Path, source: &str, date: NaiveDate) -> io::Result<Self> {
        let dir = partition_dir(log_root, date, source);
        fs::create_dir_all(&dir)?;

        let epoch_seconds = wall_clock_ns() / 1_000_000_000;
        let name = sink_file_name(epoch_seconds, std::process::id(), rand::random::<u32>());
        let path = dir.join(name);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            date,
            path,
            writer: BufWriter::new(file),
        })
    }
}

impl PartitionedSink {
    /// Create a sink in the closed state.
    ///
    /// No directory or file is touched until the first write; the caller
    /// is expected to have validated `source` already (the logger does).
    pub fn new(log_root: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            log_root: log_root.into(),
            source: source.into(),
            state: SinkState::Closed,
            dropped: 0,
            last_error: None,
        }
    }

    /// Append one record to the partition for `local_date`.
    ///
    /// Serializes to a single JSON line, appends, and flushes before
    /// returning. Failures are reported to the diagnostic channel and the
    /// line is dropped; the stale handle is discarded so the next write
    /// retries the full open path.
    pub fn write(&mut self, record: &LogRecord, local_date: NaiveDate) {
        if let Err(e) = self.try_write(record, local_date) {
            self.dropped += 1;
            self.report("dropping log line", &e);
            self.state = SinkState::Closed;
        }
    }

    fn try_write(&mut self, record: &LogRecord, local_date: NaiveDate) -> io::Result<()> {
        let reopen = !matches!(&self.state, SinkState::Open(open) if open.date == local_date);
        if reopen {
            self.close_current();
            let open = OpenPartition::create(&self.log_root, &self.source, local_date)?;
            self.state = SinkState::Open(open);
        }

        if let SinkState::Open(open) = &mut self.state {
            let line = record
                .to_json_line()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(open.writer, "{}", line)?;
            open.writer.flush()?;
        }
        Ok(())
    }

    /// Close the current handle, transitioning back to the closed state.
    ///
    /// Used at process shutdown; close errors go to the diagnostic channel.
    pub fn close(&mut self) {
        self.close_current();
    }

    fn close_current(&mut self) {
        if let SinkState::Open(mut open) = std::mem::replace(&mut self.state, SinkState::Closed) {
            if let Err(e) = open.writer.flush() {
                self.report(&format!("closing {}", open.path.display()), &e);
            }
        }
    }

    fn report(&mut self, context: &str, err: &dyn std::fmt::Display) {
        let msg = format!("hivelog[{}]: {}: {}", self.source, context, err);
        eprintln!("{}", msg);
        self.last_error = Some(msg);
    }

    /// Path of the currently open file, if any.
    pub fn current_path(&self) -> Option<&Path> {
        match &self.state {
            SinkState::Open(open) => Some(&open.path),
            SinkState::Closed => None,
        }
    }

    /// Local date of the currently open partition, if any.
    pub fn current_date(&self) -> Option<NaiveDate> {
        match &self.state {
            SinkState::Open(open) => Some(open.date),
            SinkState::Closed => None,
        }
    }

    /// Lines dropped due to I/O failures since construction.
    pub fn dropped_lines(&self) -> u64 {
        self.dropped
    }

    /// Most recent diagnostic message, if any failure occurred.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Drop for PartitionedSink {
    fn drop(&mut self) {
        self.close_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::Callsite;
    use tempfile::TempDir;

    fn record(ts: u64, msg: &str) -> LogRecord {
        LogRecord::new(
            ts,
            Level::Info,
            "web_server",
            std::process::id(),
            Callsite {
                file: "src/web_server.rs",
                line: 10,
                func: "serve",
            },
            msg,
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_first_write_creates_partition_structure() {
        let temp = TempDir::new().unwrap();
        let mut sink = PartitionedSink::new(temp.path(), "web_server");
        assert!(sink.current_path().is_none());

        sink.write(&record(1, "hello"), date("2026-02-12"));

        let partition = temp.path().join("date=2026-02-12").join("source=web_server");
        assert!(partition.is_dir());

        let path = sink.current_path().unwrap();
        assert!(path.starts_with(&partition));
        assert!(path.to_string_lossy().ends_with(".ndjson"));
        assert_eq!(sink.dropped_lines(), 0);
    }

    #[test]
    fn test_write_is_durable_before_return() {
        let temp = TempDir::new().unwrap();
        let mut sink = PartitionedSink::new(temp.path(), "web_server");

        let rec = record(42, "durable \"line\" with\nnewline");
        sink.write(&rec, date("2026-02-12"));

        // Re-open independently without dropping the sink: the line must
        // already be complete on disk.
        let content = fs::read_to_string(sink.current_path().unwrap()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 1);

        let parsed = LogRecord::from_json_line(lines[0]).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn test_rollover_opens_new_file_under_new_date() {
        let temp = TempDir::new().unwrap();
        let mut sink = PartitionedSink::new(temp.path(), "web_server");

        sink.write(&record(1, "yesterday"), date("2026-02-12"));
        let old_path = sink.current_path().unwrap().to_path_buf();

        sink.write(&record(2, "today"), date("2026-02-13"));
        let new_path = sink.current_path().unwrap().to_path_buf();

        assert_ne!(old_path, new_path);
        assert!(new_path.starts_with(temp.path().join("date=2026-02-13")));

        // No record lands in the stale file after rollover.
        let old_content = fs::read_to_string(&old_path).unwrap();
        assert_eq!(old_content.lines().count(), 1);
        assert!(old_content.contains("yesterday"));

        let new_content = fs::read_to_string(&new_path).unwrap();
        assert_eq!(new_content.lines().count(), 1);
        assert!(new_content.contains("today"));
    }

    #[test]
    fn test_same_date_reuses_handle() {
        let temp = TempDir::new().unwrap();
        let mut sink = PartitionedSink::new(temp.path(), "web_server");

        sink.write(&record(1, "one"), date("2026-02-12"));
        let first_path = sink.current_path().unwrap().to_path_buf();
        sink.write(&record(2, "two"), date("2026-02-12"));

        assert_eq!(sink.current_path().unwrap(), first_path.as_path());
        let content = fs::read_to_string(&first_path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_io_failure_drops_line_and_reports() {
        let temp = TempDir::new().unwrap();
        // A plain file where the log root should be: create_dir_all fails.
        let bogus_root = temp.path().join("not_a_dir");
        fs::write(&bogus_root, b"occupied").unwrap();

        let mut sink = PartitionedSink::new(&bogus_root, "web_server");
        sink.write(&record(1, "lost"), date("2026-02-12"));

        assert_eq!(sink.dropped_lines(), 1);
        assert!(sink.last_error().is_some());
        assert!(sink.current_path().is_none());
    }

    #[test]
    fn test_recovers_after_failure() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("logs");
        fs::write(&root, b"occupied").unwrap();

        let mut sink = PartitionedSink::new(&root, "web_server");
        sink.write(&record(1, "lost"), date("2026-02-12"));
        assert_eq!(sink.dropped_lines(), 1);

        // Clear the obstruction; the next write retries from scratch.
        fs::remove_file(&root).unwrap();
        sink.write(&record(2, "kept"), date("2026-02-12"));

        assert_eq!(sink.dropped_lines(), 1);
        let content = fs::read_to_string(sink.current_path().unwrap()).unwrap();
        assert!(content.contains("kept"));
    }

    #[test]
    fn test_explicit_close_returns_to_closed() {
        let temp = TempDir::new().unwrap();
        let mut sink = PartitionedSink::new(temp.path(), "web_server");

        sink.write(&record(1, "one"), date("2026-02-12"));
        assert!(sink.current_path().is_some());

        sink.close();
        assert!(sink.current_path().is_none());
        assert!(sink.current_date().is_none());

        // Writing again opens a fresh file in the same partition.
        sink.write(&record(2, "two"), date("2026-02-12"));
        assert!(sink.current_path().is_some());
    }

    #[test]
    fn test_two_sinks_same_partition_distinct_files() {
        let temp = TempDir::new().unwrap();
        let mut a = PartitionedSink::new(temp.path(), "web_server");
        let mut b = PartitionedSink::new(temp.path(), "web_server");

        a.write(&record(1, "from a"), date("2026-02-12"));
        b.write(&record(2, "from b"), date("2026-02-12"));

        assert_ne!(a.current_path().unwrap(), b.current_path().unwrap());
    }
}
