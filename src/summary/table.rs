//! Text table rendering of a `Summary`.
//!
//! Layout:
//! ```text
//! Total time measured on thread 'main': 120 ms
//! ──────────────────────────────────────────
//!     #     ms    avg     %    method
//! ──────────────────────────────────────────
//!     1    120    120   100    └ OrderController.create
//! ──────────────────────────────────────────
//! ```

use super::report::Summary;
use crate::config::Mode;
use crate::formatter::summary_prefix;
use crate::recorder::ContextState;
use crate::utils::config::SUMMARY_RULE;
use std::fmt::Write;

/// Column header row
pub const COLUMN_HEADER: &str = "    #     ms    avg     %    method";

/// Render a summary as a text table
///
/// Glyphs only appear in TREE mode; column layout is the same in every mode.
pub fn render_table(summary: &Summary, mode: Mode) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "Total time measured on thread '{}': {} ms",
        summary.context, summary.total_millis
    );
    let _ = writeln!(out, "{}", SUMMARY_RULE);
    let _ = writeln!(out, "{}", COLUMN_HEADER);
    let _ = writeln!(out, "{}", SUMMARY_RULE);

    for row in &summary.rows {
        let _ = writeln!(
            out,
            "{:>5} {:>6} {:>6} {:>5}    {}{}",
            row.count,
            row.total_millis,
            row.avg_millis,
            row.percent,
            summary_prefix(mode, row.depth),
            row.identity
        );
    }

    let _ = writeln!(out, "{}", SUMMARY_RULE);
    out
}

/// Aggregate and render a context's state in one step
pub fn render(state: &ContextState, mode: Mode) -> String {
    render_table(&Summary::from_state(state), mode)
}
