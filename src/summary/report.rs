//! Aggregate a context's completed calls into summary rows.
//!
//! One row per call path, in the order the paths were first seen.

use crate::recorder::ContextState;
use log::debug;

/// Summary of everything one execution context recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Context (thread) name
    pub context: String,

    /// Sum of elapsed time over all recorded calls
    pub total_millis: u64,

    pub rows: Vec<SummaryRow>,
}

/// Aggregate of all calls sharing one call path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Number of calls
    pub count: u64,

    /// Total elapsed millis
    pub total_millis: u64,

    /// floor(total / count)
    pub avg_millis: u64,

    /// floor(total * 100 / context total), 0 when the context total is 0
    pub percent: u64,

    /// Number of ancestors on the call path
    pub depth: usize,

    pub identity: String,
}

impl Summary {
    /// Build a summary from a context's state
    ///
    /// **Public** - main entry point for aggregation
    pub fn from_state(state: &ContextState) -> Self {
        let total_millis = state.record_index.total_millis();

        let rows: Vec<SummaryRow> = state
            .record_index
            .groups()
            .filter_map(|(_, records)| {
                let first = records.first()?;
                let count = records.len() as u64;
                let ms: u64 = records.iter().map(|r| r.elapsed_millis).sum();
                Some(SummaryRow {
                    count,
                    total_millis: ms,
                    avg_millis: ms / count,
                    percent: percent_of(ms, total_millis),
                    depth: first.depth(),
                    identity: first.identity.clone(),
                })
            })
            .collect();

        debug!(
            "Summarised {} call paths ({} ms) for context '{}'",
            rows.len(),
            total_millis,
            state.name
        );

        Self {
            context: state.name.clone(),
            total_millis,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of calls over all rows
    pub fn call_count(&self) -> u64 {
        self.rows.iter().map(|row| row.count).sum()
    }

    /// Row with the largest total time, first one wins ties
    pub fn hottest(&self) -> Option<&SummaryRow> {
        self.rows.iter().fold(None, |best: Option<&SummaryRow>, row| match best {
            Some(best) if best.total_millis >= row.total_millis => Some(best),
            _ => Some(row),
        })
    }
}

/// Integer percentage; 0 when there is nothing to divide by
fn percent_of(part: u64, total: u64) -> u64 {
    if total == 0 {
        0
    } else {
        ((part as u128 * 100) / total as u128) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::CallRecord;

    fn state_with(records: Vec<CallRecord>) -> ContextState {
        let mut state = ContextState::new("worker-1");
        for record in records {
            state.record_index.insert(record);
        }
        state
    }

    #[test]
    fn test_rows_follow_first_occurrence() {
        let state = state_with(vec![
            CallRecord::new(vec!["A".into()], "B", 20),
            CallRecord::new(vec!["A".into()], "B", 10),
            CallRecord::new(vec![], "A", 70),
        ]);

        let summary = Summary::from_state(&state);

        assert_eq!(summary.context, "worker-1");
        assert_eq!(summary.total_millis, 100);
        assert_eq!(summary.rows.len(), 2);

        let b = &summary.rows[0];
        assert_eq!(b.identity, "B");
        assert_eq!(b.count, 2);
        assert_eq!(b.total_millis, 30);
        assert_eq!(b.avg_millis, 15);
        assert_eq!(b.percent, 30);
        assert_eq!(b.depth, 1);

        assert_eq!(summary.rows[1].percent, 70);
        assert_eq!(summary.call_count(), 3);
        assert_eq!(summary.hottest().unwrap().identity, "A");
    }

    #[test]
    fn test_average_and_percent_floor() {
        let state = state_with(vec![
            CallRecord::new(vec![], "A", 1),
            CallRecord::new(vec![], "A", 1),
            CallRecord::new(vec![], "A", 2),
            CallRecord::new(vec![], "B", 2),
        ]);

        let summary = Summary::from_state(&state);
        assert_eq!(summary.rows[0].avg_millis, 1);
        assert_eq!(summary.rows[0].percent, 66);
        assert_eq!(summary.rows[1].percent, 33);
    }

    #[test]
    fn test_zero_total_gives_zero_percent() {
        let state = state_with(vec![
            CallRecord::new(vec![], "A", 0),
            CallRecord::new(vec!["A".into()], "B", 0),
        ]);

        let summary = Summary::from_state(&state);
        assert_eq!(summary.total_millis, 0);
        assert!(summary.rows.iter().all(|row| row.percent == 0));
    }

    #[test]
    fn test_empty_state() {
        let summary = Summary::from_state(&ContextState::new("idle"));
        assert!(summary.is_empty());
        assert_eq!(summary.total_millis, 0);
        assert!(summary.hottest().is_none());
    }
}
