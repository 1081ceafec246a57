//! Human-readable rendering of calls.
//!
//! This module handles:
//! - Resolving "Target.method" identities (including proxy unwrapping)
//! - Rendering arguments and return values with bounded length
//! - Tree-drawing prefixes for trace lines and summaries

pub mod identity;
pub mod signature;
pub mod tree;
pub mod value;

// Re-export main types and functions
pub use identity::{
    default_rename_rules, format_identity, resolve_target_name, CallTarget, ProxiedTarget,
    ProxyRenameRule, TargetDescriptor,
};
pub use signature::{format_call, format_return_value, format_value, truncate_chars};
pub use tree::{summary_prefix, trace_prefix};
pub use value::{
    simple_type_name, Describe, RequestSummary, ResponseSummary, ToTraceValue, TraceValue,
    UploadedFile,
};
