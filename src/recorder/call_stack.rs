//! Per-context call stack and the index of completed calls.
//!
//! Every completed call is filed under its call-path key:
//! "ancestor---ancestor---identity"
//!
//! Example: "OrderController.create---OrderService.process"
//! means OrderService.process was called while OrderController.create was running.

use crate::utils::config::CALL_PATH_SEPARATOR;
use std::collections::HashMap;

/// A single completed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Identities of the calls that were still running when this one started
    pub call_path: Vec<String>,

    /// Target and method, e.g. "OrderService.process"
    pub identity: String,

    pub elapsed_millis: u64,
}

impl CallRecord {
    pub fn new(call_path: Vec<String>, identity: impl Into<String>, elapsed_millis: u64) -> Self {
        Self {
            call_path,
            identity: identity.into(),
            elapsed_millis,
        }
    }

    /// Key under which this record is grouped in the index
    pub fn key(&self) -> String {
        call_path_key(&self.call_path, &self.identity)
    }

    /// Nesting depth (0 for a root call)
    pub fn depth(&self) -> usize {
        self.call_path.len()
    }
}

/// An in-flight call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFrame {
    pub call_path: Vec<String>,
    pub identity: String,
    pub start_millis: u64,
}

impl ActiveFrame {
    /// Turn the frame into a completed record, ending at `now_millis`
    pub fn complete(self, now_millis: u64) -> CallRecord {
        CallRecord {
            elapsed_millis: now_millis.saturating_sub(self.start_millis),
            call_path: self.call_path,
            identity: self.identity,
        }
    }
}

/// Build the grouping key for a call path and identity
pub fn call_path_key(call_path: &[String], identity: &str) -> String {
    if call_path.is_empty() {
        identity.to_string()
    } else {
        format!(
            "{}{}{}",
            call_path.join(CALL_PATH_SEPARATOR),
            CALL_PATH_SEPARATOR,
            identity
        )
    }
}

/// Completed calls grouped by key, keys kept in first-occurrence order
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    groups: Vec<(String, Vec<CallRecord>)>,
    positions: HashMap<String, usize>,
}

impl RecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CallRecord) {
        let key = record.key();
        match self.positions.get(&key) {
            Some(&position) => self.groups[position].1.push(record),
            None => {
                self.positions.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![record]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[CallRecord]> {
        self.positions
            .get(key)
            .map(|&position| self.groups[position].1.as_slice())
    }

    /// Groups in first-occurrence order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[CallRecord])> {
        self.groups
            .iter()
            .map(|(key, records)| (key.as_str(), records.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(key, _)| key.as_str())
    }

    /// Sum of elapsed time over every record
    pub fn total_millis(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|(_, records)| records)
            .map(|record| record.elapsed_millis)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.positions.clear();
    }
}

/// Everything one execution context owns
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    /// Display name, usually the thread name
    pub name: String,
    pub active_stack: Vec<ActiveFrame>,
    pub record_index: RecordIndex,
}

impl ContextState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, identity: impl Into<String>, now_millis: u64) {
        let call_path = self
            .active_stack
            .iter()
            .map(|frame| frame.identity.clone())
            .collect();

        self.active_stack.push(ActiveFrame {
            call_path,
            identity: identity.into(),
            start_millis: now_millis,
        });
    }

    /// Complete the top frame and file its record; `None` if nothing is running
    pub fn pop(&mut self, now_millis: u64) -> Option<u64> {
        let record = self.active_stack.pop()?.complete(now_millis);
        let elapsed = record.elapsed_millis;
        self.record_index.insert(record);
        Some(elapsed)
    }

    pub fn depth(&self) -> usize {
        self.active_stack.len()
    }

    pub fn clear(&mut self) {
        self.active_stack.clear();
        self.record_index.clear();
    }
}
