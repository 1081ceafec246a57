//! Configuration defaults and constants shared across the engine.

/// Log target used for trace lines and summaries.
///
/// Hosts filter on this, e.g. `RUST_LOG=call_profiler=trace`.
pub const LOG_TARGET: &str = "call_profiler";

// Defaults mirrored by ProfilingConfig::default()
pub const DEFAULT_TRUNCATE_LENGTH: usize = 100;
pub const DEFAULT_TRACE_ORDER: i32 = -1;
pub const DEFAULT_SUMMARY_ORDER: i32 = -2;

/// Joins ancestor identities into a call-path key. Never part of an identity.
pub const CALL_PATH_SEPARATOR: &str = "---";

/// Appended whenever a rendered value is cut short
pub const ELLIPSIS: &str = "...";

// Sentinels for target resolution
pub const NO_TARGET: &str = "[no target]";
pub const UNRESOLVABLE_TARGET: &str = "[target can't be resolved]";

/// Shown in trace lines when the call never produced a value (e.g. it panicked)
pub const NO_RETURN_VALUE: &str = "[no return value obtained]";

/// Data-access implementation names reported as their interface instead
pub const GENERIC_REPOSITORY_TYPES: &[&str] = &["SimpleJpaRepository"];
pub const GENERIC_REPOSITORY_SUFFIXES: &[&str] = &["RepositoryImpl"];

/// Horizontal rule framing the summary table
pub const SUMMARY_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────";
