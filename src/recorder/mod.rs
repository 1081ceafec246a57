//! Call-stack recording per execution context.
//!
//! This module keeps, for every execution context:
//! - The stack of calls that are still running
//! - An index of completed calls, grouped by full call path
//!
//! Operations without a context argument act on the calling thread's context.

pub mod call_stack;
pub mod clock;
pub mod registry;

// Re-export main types
pub use call_stack::{call_path_key, ActiveFrame, CallRecord, ContextState, RecordIndex};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use registry::{ContextId, ContextRegistry};

use log::debug;
use std::sync::Arc;

/// Records nested call timing for any number of execution contexts
pub struct CallStackRecorder {
    registry: ContextRegistry,
    clock: Arc<dyn Clock>,
}

impl Default for CallStackRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallStackRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallStackRecorder")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl CallStackRecorder {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: ContextRegistry::new(),
            clock,
        }
    }

    /// Start a call in the current context
    pub fn push(&self, identity: &str) {
        self.push_in(ContextId::current(), identity);
    }

    /// Finish the innermost call in the current context
    pub fn pop(&self) -> Option<u64> {
        self.pop_in(ContextId::current())
    }

    pub fn clear(&self) {
        self.clear_in(ContextId::current());
    }

    pub fn depth(&self) -> usize {
        self.depth_in(ContextId::current())
    }

    pub fn push_in(&self, context: ContextId, identity: &str) {
        let now = self.clock.now_millis();
        self.registry
            .with_state(context, |state| state.push(identity, now));
    }

    /// Elapsed millis of the finished call, or `None` if nothing was running
    pub fn pop_in(&self, context: ContextId) -> Option<u64> {
        let now = self.clock.now_millis();
        let elapsed = self.registry.with_state(context, |state| state.pop(now));
        if elapsed.is_none() {
            debug!("pop without matching push in context {}", context);
        }
        elapsed
    }

    pub fn clear_in(&self, context: ContextId) {
        self.registry.with_state(context, ContextState::clear);
    }

    pub fn depth_in(&self, context: ContextId) -> usize {
        self.registry
            .with_existing(context, |state| state.depth())
            .unwrap_or(0)
    }

    /// Give a context a display name for its summaries
    pub fn name_context(&self, context: ContextId, name: impl Into<String>) {
        let name = name.into();
        self.registry.with_state(context, |state| state.name = name);
    }

    /// Copy of a context's state, for reporting
    pub fn snapshot_in(&self, context: ContextId) -> ContextState {
        self.registry.with_state(context, |state| state.clone())
    }

    pub fn snapshot(&self) -> ContextState {
        self.snapshot_in(ContextId::current())
    }

    /// Forget a context completely, e.g. when a pooled worker finishes a job
    pub fn release_in(&self, context: ContextId) -> bool {
        self.registry.release(context)
    }

    pub fn release(&self) -> bool {
        self.release_in(ContextId::current())
    }

    pub fn context_count(&self) -> usize {
        self.registry.len()
    }
}
