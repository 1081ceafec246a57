//! Summary statistics over recorded calls.
//!
//! This module turns a context's record index into:
//! - `Summary` rows (count, total, average, percentage per call path)
//! - A fixed-width text table for logs and terminals

pub mod report;
pub mod table;

// Re-export main types and functions
pub use report::{Summary, SummaryRow};
pub use table::{render, render_table, COLUMN_HEADER};
