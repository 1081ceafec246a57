//! Box-drawing prefixes for TREE mode.
//!
//! Purely cosmetic; every other mode gets an empty prefix.

use crate::config::Mode;

/// Prefix for a trace line of a call at `depth` (1 = outermost).
///
/// `exiting` picks the closing glyph for outermost calls.
pub fn trace_prefix(mode: Mode, depth: usize, exiting: bool) -> String {
    if !mode.is_tree() {
        return String::new();
    }

    if depth > 1 {
        format!("├{} ", "─".repeat(depth - 1))
    } else if exiting {
        "└ ".to_string()
    } else {
        "┌ ".to_string()
    }
}

/// Prefix for a summary row whose call path has `path_len` ancestors
pub fn summary_prefix(mode: Mode, path_len: usize) -> String {
    if !mode.is_tree() {
        return String::new();
    }

    if path_len > 0 {
        format!("├{} ", "─".repeat(path_len))
    } else {
        "└ ".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_prefix() {
        assert_eq!(trace_prefix(Mode::Tree, 1, false), "┌ ");
        assert_eq!(trace_prefix(Mode::Tree, 1, true), "└ ");
        assert_eq!(trace_prefix(Mode::Tree, 3, false), "├── ");
        assert_eq!(trace_prefix(Mode::Plain, 3, false), "");
        assert_eq!(trace_prefix(Mode::Verbose, 1, true), "");
    }

    #[test]
    fn test_summary_prefix() {
        assert_eq!(summary_prefix(Mode::Tree, 0), "└ ");
        assert_eq!(summary_prefix(Mode::Tree, 2), "├── ");
        assert_eq!(summary_prefix(Mode::Plain, 2), "");
    }
}
