//! Partition path resolution.
//!
//! The on-disk layout is the contract every reader of the log tree relies
//! on for partition pruning:
//!
//! ```text
//! <log_root>/date=<YYYY-MM-DD>/source=<name>/<epoch_secs>-<pid>-<rand8hex>.ndjson
//! ```
//!
//! Everything here is pure computation; directory creation belongs to the
//! sink. The parse helpers are the inverse used by the query reader and
//! the retention sweeper.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::LogError;

/// Extension carried by every sink file.
pub const SINK_FILE_EXT: &str = "ndjson";

const DATE_PREFIX: &str = "date=";
const SOURCE_PREFIX: &str = "source=";

/// Longest accepted source name, in bytes.
const MAX_SOURCE_LEN: usize = 128;

/// Check that `source` is safe to interpolate into a partition path.
///
/// Accepts ASCII alphanumerics plus `_`, `-` and interior dots. Rejects
/// anything that could escape the log root (path separators, leading dot,
/// empty name) so a hostile or buggy source value cannot write outside
/// the partition tree.
pub fn validate_source(source: &str) -> Result<(), LogError> {
    let ok = !source.is_empty()
        && source.len() <= MAX_SOURCE_LEN
        && !source.starts_with('.')
        && source
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');

    if ok {
        Ok(())
    } else {
        Err(LogError::InvalidSource(source.to_string()))
    }
}

/// Directory for the (`date`, `source`) partition.
pub fn partition_dir(log_root: &Path, date: NaiveDate, source: &str) -> PathBuf {
    log_root
        .join(format!("{}{}", DATE_PREFIX, date.format("%Y-%m-%d")))
        .join(format!("{}{}", SOURCE_PREFIX, source))
}

/// File name for one sink-open event.
///
/// Uniqueness across processes and restarts comes from the triple: a
/// collision needs identical epoch second, identical pid and an identical
/// random token from two writers.
pub fn sink_file_name(epoch_seconds: u64, pid: u32, token: u32) -> String {
    format!("{}-{}-{:08x}.{}", epoch_seconds, pid, token, SINK_FILE_EXT)
}

/// Parse a top-level `date=YYYY-MM-DD` directory name.
pub fn parse_date_dir(name: &str) -> Option<NaiveDate> {
    let value = name.strip_prefix(DATE_PREFIX)?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse a second-level `source=<name>` directory name.
pub fn parse_source_dir(name: &str) -> Option<&str> {
    name.strip_prefix(SOURCE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_partition_dir_layout() {
        let dir = partition_dir(Path::new("/tmp/app_logs"), date("2026-02-12"), "web_server");
        assert_eq!(
            dir,
            PathBuf::from("/tmp/app_logs/date=2026-02-12/source=web_server")
        );
    }

    #[test]
    fn test_sink_file_name_format() {
        let name = sink_file_name(1_739_300_000, 4321, 0xdeadbeef);
        assert_eq!(name, "1739300000-4321-deadbeef.ndjson");

        // Small tokens are zero-padded so the token field is always 8 hex chars.
        let name = sink_file_name(1, 2, 0xf);
        assert_eq!(name, "1-2-0000000f.ndjson");
    }

    #[test]
    fn test_distinct_tokens_never_collide() {
        let mut seen = std::collections::HashSet::new();
        for token in 0..10_000u32 {
            assert!(seen.insert(sink_file_name(1_739_300_000, 4321, token)));
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn test_validate_source_accepts_identifiers() {
        for source in ["web_server", "task-worker", "api.v2", "a", "A9"] {
            assert!(validate_source(source).is_ok(), "{} should be valid", source);
        }
    }

    #[test]
    fn test_validate_source_rejects_path_escapes() {
        for source in [
            "",
            "..",
            ".hidden",
            "a/b",
            "a\\b",
            "../../etc",
            "name with space",
            "null\0byte",
        ] {
            assert!(
                validate_source(source).is_err(),
                "{:?} should be rejected",
                source
            );
        }
    }

    #[test]
    fn test_validate_source_rejects_overlong_names() {
        let long = "a".repeat(129);
        assert!(validate_source(&long).is_err());
        let just_fits = "a".repeat(128);
        assert!(validate_source(&just_fits).is_ok());
    }

    #[test]
    fn test_parse_date_dir() {
        assert_eq!(parse_date_dir("date=2026-02-12"), Some(date("2026-02-12")));
        assert_eq!(parse_date_dir("date=not-a-date"), None);
        assert_eq!(parse_date_dir("2026-02-12"), None);
        assert_eq!(parse_date_dir("source=web"), None);
    }

    #[test]
    fn test_parse_source_dir() {
        assert_eq!(parse_source_dir("source=web_server"), Some("web_server"));
        assert_eq!(parse_source_dir("date=2026-02-12"), None);
    }

    #[test]
    fn test_partition_roundtrip() {
        let d = date("2026-12-31");
        let dir = partition_dir(Path::new("/logs"), d, "api");
        let source_name = dir.file_name().unwrap().to_str().unwrap();
        let date_name = dir
            .parent()
            .unwrap()
            .file_name()
            .unwrap()
            .to_str()
            .unwrap();

        assert_eq!(parse_source_dir(source_name), Some("api"));
        assert_eq!(parse_date_dir(date_name), Some(d));
    }
}
