//! Runtime options consumed by the profiler.
//!
//! The host decides where these come from (CLI flags, a settings file,
//! environment). `ProfilingConfig` derives `Deserialize` so any serde source
//! works, and offers builder methods for programmatic setup.

use crate::utils::config::{DEFAULT_SUMMARY_ORDER, DEFAULT_TRACE_ORDER, DEFAULT_TRUNCATE_LENGTH};
use crate::utils::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Display mode for trace lines and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// No glyphs, single-line values
    Plain,
    /// Box-drawing glyphs showing the call tree
    #[default]
    Tree,
    /// Multi-line signatures, values never truncated
    Verbose,
}

impl Mode {
    pub fn is_tree(self) -> bool {
        self == Mode::Tree
    }

    pub fn is_verbose(self) -> bool {
        self == Mode::Verbose
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLAIN" => Ok(Mode::Plain),
            "TREE" => Ok(Mode::Tree),
            "VERBOSE" => Ok(Mode::Verbose),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Plain => "PLAIN",
            Mode::Tree => "TREE",
            Mode::Verbose => "VERBOSE",
        };
        f.write_str(name)
    }
}

/// Set of `Target.method` identities that bypass profiling entirely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IgnoreList(BTreeSet<String>);

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.0.contains(identity)
    }

    pub fn insert(&mut self, identity: impl Into<String>) {
        self.0.insert(identity.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromStr for IgnoreList {
    type Err = std::convert::Infallible;

    /// Parse a comma-separated list; blanks are dropped
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for IgnoreList {
    /// Accepts either `"A.x, B.y"` or `["A.x", "B.y"]`
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Joined(String),
            List(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Joined(joined) => match joined.parse() {
                Ok(list) => list,
                Err(never) => match never {},
            },
            Raw::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        })
    }
}

/// Profiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfilingConfig {
    /// Master switch. When off, instrumented calls pass straight through.
    pub enabled: bool,

    pub mode: Mode,

    /// Max characters for rendered values, unless mode is VERBOSE
    pub truncate: Option<usize>,

    pub ignore: IgnoreList,

    /// Ordering of the tracing advice (lower runs further outside)
    pub trace_order: i32,

    /// Ordering of the summary advice (lower runs further outside)
    pub summary_order: i32,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: Mode::Tree,
            truncate: Some(DEFAULT_TRUNCATE_LENGTH),
            ignore: IgnoreList::new(),
            trace_order: DEFAULT_TRACE_ORDER,
            summary_order: DEFAULT_SUMMARY_ORDER,
        }
    }
}

impl ProfilingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_truncate(mut self, truncate: Option<usize>) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_ignore(mut self, ignore: IgnoreList) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_orders(mut self, trace_order: i32, summary_order: i32) -> Self {
        self.trace_order = trace_order;
        self.summary_order = summary_order;
        self
    }

    /// Pretty printing happens only in VERBOSE mode
    pub fn pretty_print(&self) -> bool {
        self.mode.is_verbose()
    }

    /// True when the identity should be profiled at all
    pub fn should_profile(&self, identity: &str) -> bool {
        self.enabled && !self.ignore.contains(identity)
    }

    /// True when the summary advice wraps the tracing advice.
    ///
    /// Ties resolve to the summary being outermost.
    pub fn summary_wraps_trace(&self) -> bool {
        self.summary_order <= self.trace_order
    }
}
