//! Query reader over the partition tree.
//!
//! Reads the directory layout the sink produces, treating `date=` and
//! `source=` path segments as relational columns. Partitions excluded by
//! the filter are pruned from the walk without opening any file. Readers
//! must tolerate files being appended-to concurrently: a torn trailing
//! line is simply "fewer lines observed", never an error, because writers
//! append whole lines and flush immediately.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::clock::wall_clock_ns;
use crate::config::local_date_for;
use crate::error::LogResult;
use crate::level::Level;
use crate::path::{parse_date_dir, parse_source_dir, SINK_FILE_EXT};
use crate::record::LogRecord;

/// Filter for [`records`]. Mirrors the parameters a log-investigation
/// session actually uses: a time window or an exact partition date, a
/// source, a level, a keyword.
#[derive(Debug, Clone)]
pub struct QueryFilter {
    /// Exact partition date. When set, `since` is ignored.
    pub date: Option<NaiveDate>,

    /// Look-back window relative to now.
    pub since: Option<Duration>,

    /// Filter by source partition.
    pub source: Option<String>,

    /// Filter by exact level.
    pub level: Option<Level>,

    /// Case-insensitive substring match on `msg`.
    pub keyword: Option<String>,

    /// Maximum records returned (newest first).
    pub limit: usize,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            date: None,
            since: Some(Duration::from_secs(60 * 60)),
            source: None,
            level: None,
            keyword: None,
            limit: 100,
        }
    }
}

/// One (`date`, `source`) partition found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRef {
    pub date: NaiveDate,
    pub source: String,
    pub dir: PathBuf,
}

/// Per-(source, date) summary, for discovering what exists before querying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub source: String,
    pub date: NaiveDate,
    pub entries: usize,
    /// Smallest `ts` in the partition, nanosecond epoch.
    pub earliest: u64,
    /// Largest `ts` in the partition, nanosecond epoch.
    pub latest: u64,
}

/// Enumerate partitions under `log_root`, ordered by (date, source).
///
/// Entries that don't follow the `date=`/`source=` two-level structure
/// are ignored; the tree is shared with nothing else, but a stray file
/// must not break every query.
pub fn partitions(log_root: &Path) -> LogResult<Vec<PartitionRef>> {
    let mut found = Vec::new();
    if !log_root.exists() {
        return Ok(found);
    }

    for entry in fs::read_dir(log_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let date = match name.to_str().and_then(parse_date_dir) {
            Some(date) => date,
            None => continue,
        };

        for sub in fs::read_dir(entry.path())? {
            let sub = sub?;
            if !sub.file_type()?.is_dir() {
                continue;
            }
            let sub_name = sub.file_name();
            let source = match sub_name.to_str().and_then(parse_source_dir) {
                Some(source) => source.to_string(),
                None => continue,
            };
            found.push(PartitionRef {
                date,
                source,
                dir: sub.path(),
            });
        }
    }

    found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.source.cmp(&b.source)));
    Ok(found)
}

/// Query log records matching `filter`, newest first.
///
/// `tz` is the same display timezone the writers partition under; it is
/// used to translate the look-back window into the oldest partition date
/// that can still hold matches.
pub fn records(log_root: &Path, tz: Tz, filter: &QueryFilter) -> LogResult<Vec<LogRecord>> {
    let min_ts = match (filter.date, filter.since) {
        (Some(_), _) | (None, None) => None,
        (None, Some(since)) => {
            Some(wall_clock_ns().saturating_sub(since.as_nanos() as u64))
        }
    };
    let min_date = min_ts.map(|ts| local_date_for(ts, tz));
    let keyword = filter.keyword.as_ref().map(|k| k.to_lowercase());

    let mut matched = Vec::new();
    for partition in partitions(log_root)? {
        // Partition pruning: decided from directory names alone.
        if let Some(date) = filter.date {
            if partition.date != date {
                continue;
            }
        }
        if let Some(min_date) = min_date {
            if partition.date < min_date {
                continue;
            }
        }
        if let Some(source) = &filter.source {
            if &partition.source != source {
                continue;
            }
        }

        for record in read_partition(&partition.dir)? {
            if let Some(min_ts) = min_ts {
                if record.ts < min_ts {
                    continue;
                }
            }
            if let Some(level) = filter.level {
                if record.level != level {
                    continue;
                }
            }
            if let Some(keyword) = &keyword {
                if !record.msg.to_lowercase().contains(keyword) {
                    continue;
                }
            }
            matched.push(record);
        }
    }

    matched.sort_by(|a, b| b.ts.cmp(&a.ts));
    matched.truncate(filter.limit);
    Ok(matched)
}

/// Summarize available sources, newest date first, busiest source first.
pub fn sources(log_root: &Path, date: Option<NaiveDate>) -> LogResult<Vec<SourceSummary>> {
    let mut summaries = Vec::new();

    for partition in partitions(log_root)? {
        if let Some(date) = date {
            if partition.date != date {
                continue;
            }
        }

        let mut entries = 0;
        let mut earliest = u64::MAX;
        let mut latest = 0;
        for record in read_partition(&partition.dir)? {
            entries += 1;
            earliest = earliest.min(record.ts);
            latest = latest.max(record.ts);
        }
        if entries == 0 {
            continue;
        }

        summaries.push(SourceSummary {
            source: partition.source,
            date: partition.date,
            entries,
            earliest,
            latest,
        });
    }

    summaries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.entries.cmp(&a.entries))
            .then_with(|| a.source.cmp(&b.source))
    });
    Ok(summaries)
}

/// Read every record in one partition directory.
///
/// Lines that fail to parse are skipped: a concurrent writer's torn final
/// line looks exactly like this, and treating it as corruption would make
/// every live query racy.
fn read_partition(dir: &Path) -> LogResult<Vec<LogRecord>> {
    let mut found = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_path = entry.path();
        let is_sink_file = file_path
            .extension()
            .map(|ext| ext == SINK_FILE_EXT)
            .unwrap_or(false);
        if !is_sink_file {
            continue;
        }

        let content = fs::read_to_string(&file_path)?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(record) = LogRecord::from_json_line(line) {
                found.push(record);
            }
        }
    }

    Ok(found)
}
