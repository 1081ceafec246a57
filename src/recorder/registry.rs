//! Registry of per-context tracing state.
//!
//! Each execution context gets a `ContextId`. By default that is one id per
//! OS thread, handed out on first use. State is created lazily and is only
//! ever touched through its own id.
//!
//! A thread's own state is dropped from every registry when the thread
//! exits. State under ids minted with `ContextId::next` lives until
//! `release`.

use super::call_stack::ContextState;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

type StateMap = Mutex<HashMap<ContextId, ContextState>>;

thread_local! {
    static THREAD_CONTEXT: ThreadContext = ThreadContext::new();
}

/// The calling thread's id, plus every registry holding state under it
struct ThreadContext {
    id: ContextId,
    registries: RefCell<Vec<Weak<StateMap>>>,
}

impl ThreadContext {
    fn new() -> Self {
        Self {
            id: ContextId::next(),
            registries: RefCell::new(Vec::new()),
        }
    }

    fn track(&self, states: &Arc<StateMap>) {
        let mut registries = self.registries.borrow_mut();
        registries.retain(|weak| weak.strong_count() > 0);
        let handle = Arc::downgrade(states);
        if !registries.iter().any(|weak| weak.ptr_eq(&handle)) {
            registries.push(handle);
        }
    }
}

// No logging here: the logger's own thread-locals may already be gone
impl Drop for ThreadContext {
    fn drop(&mut self) {
        for weak in self.registries.get_mut().drain(..) {
            if let Some(states) = weak.upgrade() {
                states
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .remove(&self.id);
            }
        }
    }
}

/// Identity of one logical unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Mint a fresh id, for hosts whose units of work are not threads
    pub fn next() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The id bound to the calling thread
    pub fn current() -> Self {
        THREAD_CONTEXT.with(|context| context.id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Name shown in summaries: the thread name if there is one
    fn default_name(self) -> String {
        std::thread::current()
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("context-{}", self.0))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map from context id to its private state
#[derive(Debug, Default)]
pub struct ContextRegistry {
    states: Arc<StateMap>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the state of `id`, creating it on first use
    pub fn with_state<R>(&self, id: ContextId, f: impl FnOnce(&mut ContextState) -> R) -> R {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(id).or_insert_with(|| {
            let name = id.default_name();
            debug!("Creating tracing state for context {} ({})", id, name);
            self.track_if_thread_context(id);
            ContextState::new(name)
        });
        f(state)
    }

    /// Run `f` against the state of `id` only if it already exists
    pub fn with_existing<R>(&self, id: ContextId, f: impl FnOnce(&mut ContextState) -> R) -> Option<R> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get_mut(&id).map(f)
    }

    /// Have the calling thread drop `id` on exit if `id` is its own context
    fn track_if_thread_context(&self, id: ContextId) {
        // Fails only while the thread's locals are being torn down
        let _ = THREAD_CONTEXT.try_with(|context| {
            if context.id == id {
                context.track(&self.states);
            }
        });
    }

    /// Drop all state for `id`; returns whether there was any
    pub fn release(&self, id: ContextId) -> bool {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let removed = states.remove(&id).is_some();
        if removed {
            debug!("Released tracing state for context {}", id);
        }
        removed
    }

    /// Number of contexts with live state
    pub fn len(&self) -> usize {
        self.states.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
