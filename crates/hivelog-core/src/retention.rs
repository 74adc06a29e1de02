//! Retention sweeper: whole-partition deletion by age.
//!
//! Records are never deleted individually. The sweeper walks the
//! top-level `date=` directories and removes every partition strictly
//! older than the cutoff, recursively, leaving everything else alone.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

use crate::error::LogResult;
use crate::path::parse_date_dir;

/// Outcome of one sweep pass.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Date partitions removed (or, in a dry run, that would be removed).
    pub removed: Vec<PathBuf>,

    /// Date partitions younger than the cutoff, left in place.
    pub kept: usize,

    /// Entries under the log root that are not `date=` partitions.
    pub skipped: usize,
}

/// The oldest partition date retained when keeping `keep_days` days
/// before `today`.
pub fn cutoff_for(today: NaiveDate, keep_days: u32) -> NaiveDate {
    today - Days::new(u64::from(keep_days))
}

/// Delete every `date=` partition strictly older than `cutoff`.
///
/// With `dry_run` set, reports what would be removed without touching
/// the tree. Non-partition entries (stray files, foreign directories)
/// are counted and skipped, never deleted.
pub fn sweep(log_root: &Path, cutoff: NaiveDate, dry_run: bool) -> LogResult<SweepReport> {
    let mut report = SweepReport::default();
    if !log_root.exists() {
        return Ok(report);
    }

    for entry in fs::read_dir(log_root)? {
        let entry = entry?;
        let is_dir = entry.file_type()?.is_dir();
        let name = entry.file_name();
        let date = match name.to_str().and_then(parse_date_dir) {
            Some(date) if is_dir => date,
            _ => {
                report.skipped += 1;
                continue;
            }
        };

        if date < cutoff {
            if !dry_run {
                fs::remove_dir_all(entry.path())?;
            }
            report.removed.push(entry.path());
        } else {
            report.kept += 1;
        }
    }

    report.removed.sort();
    Ok(report)
}
