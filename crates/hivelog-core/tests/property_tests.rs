//! Property-based tests for the logging core
//!
//! Uses proptest to verify the invariants the partition layout and the
//! wire format promise to every reader of the tree.

use proptest::prelude::*;

use hivelog_core::path::{sink_file_name, validate_source};
use hivelog_core::{Callsite, Level, LogRecord, MonotonicClock};

// ============================================================================
// Strategy Generators
// ============================================================================

/// Arbitrary message bodies, including quotes, newlines and non-ASCII.
fn msg_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~\n\t\"\\\\°✓]{0,200}").expect("valid regex")
}

fn level_strategy() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Debug),
        Just(Level::Info),
        Just(Level::Warning),
        Just(Level::Error),
        Just(Level::Critical),
    ]
}

fn record_strategy() -> impl Strategy<Value = LogRecord> {
    (any::<u64>(), level_strategy(), 0u32..100_000, msg_strategy()).prop_map(
        |(ts, level, line, msg)| {
            LogRecord::new(
                ts,
                level,
                "web_server",
                4321,
                Callsite {
                    file: "src/web_server.rs",
                    line,
                    func: "handle_request",
                },
                msg,
            )
        },
    )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Any record survives serialize -> parse with every field intact,
    /// including the exact u64 ts and byte-exact msg content.
    #[test]
    fn record_roundtrip_is_lossless(record in record_strategy()) {
        let line = record.to_json_line().unwrap();
        prop_assert!(!line.contains('\n'));

        let parsed = LogRecord::from_json_line(&line).unwrap();
        prop_assert_eq!(parsed, record);
    }

    /// Serialization never fails, whatever the message contains.
    #[test]
    fn serialization_is_total(msg in any::<String>()) {
        let record = LogRecord::new(
            1,
            Level::Info,
            "web_server",
            1,
            Callsite { file: "a.rs", line: 1, func: "f" },
            msg,
        );
        prop_assert!(record.to_json_line().is_ok());
    }

    /// Whatever the wall clock does, allocated timestamps strictly increase.
    /// Readings are bounded well under u64::MAX (the year 2262 in epoch
    /// nanoseconds is ~2^62) so the +1 floor cannot overflow.
    #[test]
    fn allocation_is_strictly_increasing(readings in prop::collection::vec(0u64..(1u64 << 62), 1..200)) {
        let mut clock = MonotonicClock::new();
        let mut prev: Option<u64> = None;
        for now in readings {
            let ts = clock.allocate_from(now);
            if let Some(prev) = prev {
                prop_assert!(ts > prev);
            }
            prev = Some(ts);
        }
    }

    /// Source validation never lets a path separator or traversal through.
    #[test]
    fn unsafe_sources_are_rejected(source in any::<String>()) {
        if validate_source(&source).is_ok() {
            prop_assert!(!source.contains('/'));
            prop_assert!(!source.contains('\\'));
            prop_assert!(!source.starts_with('.'));
            prop_assert!(!source.is_empty());
        }
    }

    /// Distinct random tokens always produce distinct file names.
    #[test]
    fn file_names_are_injective_in_token(
        epoch in any::<u32>(),
        pid in any::<u32>(),
        a in any::<u32>(),
        b in any::<u32>(),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(
            sink_file_name(u64::from(epoch), pid, a),
            sink_file_name(u64::from(epoch), pid, b)
        );
    }
}
