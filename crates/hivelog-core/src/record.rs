//! Log record types for the NDJSON line format.
//!
//! Each record is a self-contained JSON object that can be appended
//! to an `.ndjson` file without risk of corruption from concurrent
//! writers in other processes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Call-site metadata captured at the emit location.
///
/// Normally filled in by the [`crate::callsite!`] macro (or the per-level
/// `log_*!` macros), which expand `file!()`, `line!()` and the enclosing
/// function name.
#[derive(Debug, Clone, Copy)]
pub struct Callsite {
    /// Source file as reported by `file!()`; reduced to its base name
    /// when the record is assembled.
    pub file: &'static str,

    /// Line number as reported by `line!()`.
    pub line: u32,

    /// Enclosing function name, shortest path segment.
    pub func: &'static str,
}

/// A single log record in the NDJSON line format.
///
/// One record per emitted event; constructed, serialized and appended
/// exactly once, never mutated. Deletion only happens at the granularity
/// of an entire date partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Nanoseconds since the Unix epoch, UTC. Strictly increasing within
    /// a single emitter instance.
    pub ts: u64,

    /// Severity level.
    pub level: Level,

    /// Logical component name; equals the `source=` partition value for
    /// every record in that partition.
    pub source: String,

    /// OS process id of the writer at emission time.
    pub pid: u32,

    /// Base file name of the call site (never a full path).
    pub file: String,

    /// Line number of the call site.
    pub line: u32,

    /// Function name of the call site.
    pub func: String,

    /// Formatted message body.
    pub msg: String,
}

impl LogRecord {
    /// Assemble a record from its parts.
    ///
    /// The call site's file path is reduced to its base name here, so the
    /// stored `file` field never leaks build-machine directory layout.
    pub fn new(
        ts: u64,
        level: Level,
        source: impl Into<String>,
        pid: u32,
        callsite: Callsite,
        msg: impl Into<String>,
    ) -> Self {
        let file = Path::new(callsite.file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| callsite.file.to_string());

        Self {
            ts,
            level,
            source: source.into(),
            pid,
            file,
            line: callsite.line,
            func: callsite.func.to_string(),
            msg: msg.into(),
        }
    }

    /// Serialize to a single JSON line (no trailing newline).
    ///
    /// This cannot fail for any `msg` content: free-form text is escaped
    /// by the JSON string encoder, never rejected.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Capture the current call site.
///
/// Expands to a [`Callsite`] carrying `file!()`, `line!()` and the name of
/// the enclosing function.
#[macro_export]
macro_rules! callsite {
    () => {
        $crate::Callsite {
            file: file!(),
            line: line!(),
            func: $crate::__func_name!(),
        }
    };
}

/// Resolve the enclosing function's name at compile time.
///
/// Internal helper for [`callsite!`]; keeps only the final path segment
/// so `func` matches what an operator would grep for.
#[doc(hidden)]
#[macro_export]
macro_rules! __func_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}
