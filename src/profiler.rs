//! Interception boundary between a host application and the engine.
//!
//! A host wraps each call it wants to observe:
//!
//! ```ignore
//! let call = profiler.call_site(Some(&service), "process", vec![order.to_trace_value()]);
//! let total = profiler.profile(&call, || service.process(&order));
//! ```
//!
//! `profile` pushes a frame, runs the closure, and pops the frame on every
//! exit path, including panics. With `trace` logging enabled for
//! `call_profiler`, an entry and an exit line are logged per call.
//!
//! `summarize` wraps a designated call; after it finishes (or panics) the
//! context's summary table is logged at `debug`.

use crate::config::ProfilingConfig;
use crate::formatter::{
    default_rename_rules, format_call, format_identity, format_return_value, trace_prefix,
    CallTarget, ProxyRenameRule, ToTraceValue, TraceValue,
};
use crate::recorder::{CallStackRecorder, Clock, ContextId};
use crate::summary::{self, Summary};
use crate::utils::config::{LOG_TARGET, NO_RETURN_VALUE};
use log::{debug, log_enabled, trace, Level};
use std::sync::Arc;

/// One instrumented call, as the host sees it
#[derive(Debug, Clone)]
pub struct CallSite {
    /// "Target.method"
    pub identity: String,
    pub arguments: Vec<TraceValue>,
}

impl CallSite {
    pub fn new(identity: impl Into<String>, arguments: Vec<TraceValue>) -> Self {
        Self {
            identity: identity.into(),
            arguments,
        }
    }
}

/// How an instrumented call ended
#[derive(Debug, Clone)]
pub enum CallOutcome {
    Returned {
        value: TraceValue,
        returns_void: bool,
    },
    /// The call produced an error value
    Failed(String),
    /// The call never returned (it panicked)
    Unwound,
}

impl CallOutcome {
    pub fn from_value<R: ToTraceValue + ?Sized>(value: &R) -> Self {
        match value.failure() {
            Some(message) => CallOutcome::Failed(message),
            None => CallOutcome::Returned {
                value: value.to_trace_value(),
                returns_void: value.is_void(),
            },
        }
    }
}

/// Ask for a summary around a designated call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryRequest {
    /// Reset the context first so the summary only covers this call
    pub clear_before: bool,
}

/// Call-tracing profiler shared by all execution contexts
#[derive(Debug)]
pub struct Profiler {
    config: ProfilingConfig,
    rename_rules: Vec<ProxyRenameRule>,
    recorder: CallStackRecorder,
}

impl Profiler {
    pub fn new(config: ProfilingConfig) -> Self {
        Self {
            config,
            rename_rules: default_rename_rules(),
            recorder: CallStackRecorder::new(),
        }
    }

    /// Use a custom time source, e.g. `ManualClock` in tests
    pub fn with_clock(config: ProfilingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            rename_rules: default_rename_rules(),
            recorder: CallStackRecorder::with_clock(clock),
        }
    }

    /// Replace the table of implementation names reported by interface
    pub fn with_rename_rules(mut self, rules: Vec<ProxyRenameRule>) -> Self {
        self.rename_rules = rules;
        self
    }

    pub fn config(&self) -> &ProfilingConfig {
        &self.config
    }

    pub fn recorder(&self) -> &CallStackRecorder {
        &self.recorder
    }

    /// Resolve the identity of a call on `target`
    pub fn identity(&self, target: Option<&dyn CallTarget>, method_name: &str) -> String {
        format_identity(target, method_name, &self.rename_rules)
    }

    pub fn call_site(
        &self,
        target: Option<&dyn CallTarget>,
        method_name: &str,
        arguments: Vec<TraceValue>,
    ) -> CallSite {
        CallSite::new(self.identity(target, method_name), arguments)
    }

    /*------------------------------------*\
     * Raw frame API
    \*------------------------------------*/

    /// Push a frame for `identity` in the current context.
    ///
    /// Unconditional: hosts driving frames by hand check
    /// `config().should_profile` themselves and must pair every call with
    /// `on_call_exit`.
    pub fn on_call_enter(&self, identity: &str) {
        self.recorder.push(identity);
    }

    /// Pop the innermost frame of the current context
    pub fn on_call_exit(&self) -> Option<u64> {
        self.recorder.pop()
    }

    pub fn depth(&self) -> usize {
        self.recorder.depth()
    }

    /// Empty the current context's stack and statistics
    pub fn clear(&self) {
        self.recorder.clear();
    }

    /// Drop the current context's state entirely
    pub fn release(&self) -> bool {
        self.recorder.release()
    }

    pub fn summary(&self) -> Summary {
        self.summary_in(ContextId::current())
    }

    pub fn summary_in(&self, context: ContextId) -> Summary {
        Summary::from_state(&self.recorder.snapshot_in(context))
    }

    /// Summary table of the current context
    pub fn render(&self) -> String {
        self.render_in(ContextId::current())
    }

    pub fn render_in(&self, context: ContextId) -> String {
        summary::render(&self.recorder.snapshot_in(context), self.config.mode)
    }

    /*------------------------------------*\
     * Trace lines
    \*------------------------------------*/

    /// Rendered signature of a call, per the configured mode
    pub fn signature(&self, call: &CallSite) -> String {
        format_call(
            &call.identity,
            &call.arguments,
            self.config.pretty_print(),
            self.config.truncate,
        )
    }

    /// Line logged when a call starts; `depth` includes the call itself
    pub fn trace_entry_line(&self, call: &CallSite, depth: usize) -> String {
        format!(
            "{}{}",
            trace_prefix(self.config.mode, depth, false),
            self.signature(call)
        )
    }

    /// Line logged when a call ends; `depth` includes the call itself
    pub fn trace_line(
        &self,
        call: &CallSite,
        outcome: &CallOutcome,
        elapsed_millis: u64,
        depth: usize,
    ) -> String {
        self.exit_line(&self.signature(call), outcome, elapsed_millis, depth)
    }

    fn exit_line(
        &self,
        signature: &str,
        outcome: &CallOutcome,
        elapsed_millis: u64,
        depth: usize,
    ) -> String {
        let pretty = self.config.pretty_print();
        let result = match outcome {
            CallOutcome::Returned {
                value,
                returns_void,
            } => format!(
                "returned {}",
                format_return_value(value, *returns_void, pretty, self.config.truncate)
            ),
            CallOutcome::Failed(message) => format!("failed with [{}]", message),
            CallOutcome::Unwound => format!("returned {}", NO_RETURN_VALUE),
        };
        let separator = if pretty { "\n" } else { "" };

        format!(
            "{}{} {}{} - execution time: {} ms",
            trace_prefix(self.config.mode, depth, true),
            signature,
            result,
            separator,
            elapsed_millis
        )
    }

    fn tracing_enabled() -> bool {
        log_enabled!(target: LOG_TARGET, Level::Trace)
    }

    /*------------------------------------*\
     * Scoped advices
    \*------------------------------------*/

    /// Run `f` as a profiled call.
    ///
    /// Returns exactly what `f` returns, errors included. Disabled profiling
    /// or an ignored identity runs `f` with no bookkeeping at all.
    pub fn profile<R, F>(&self, call: &CallSite, f: F) -> R
    where
        R: ToTraceValue,
        F: FnOnce() -> R,
    {
        if !self.config.should_profile(&call.identity) {
            return f();
        }

        let guard = self.enter_frame(call);
        let result = f();
        guard.finish(&result);
        result
    }

    /// Push a frame and return the guard that pops it
    pub fn enter_frame<'a>(&'a self, call: &'a CallSite) -> FrameGuard<'a> {
        let context = ContextId::current();
        self.recorder.push_in(context, &call.identity);

        let signature = if Self::tracing_enabled() {
            let depth = self.recorder.depth_in(context);
            let line = self.trace_entry_line(call, depth);
            trace!(target: LOG_TARGET, "{}", line);
            Some(self.signature(call))
        } else {
            None
        };

        FrameGuard {
            profiler: self,
            context,
            signature,
            outcome: None,
        }
    }

    /// Run `f` and log the context's summary afterwards, even if `f` panics
    pub fn summarize<R, F>(&self, clear_before: bool, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if clear_before {
            self.clear();
        }

        let _guard = SummaryGuard {
            profiler: self,
            context: ContextId::current(),
        };
        f()
    }

    /// Apply tracing and, if requested, the summary advice around `f`.
    ///
    /// The advice with the lower configured order runs outermost.
    pub fn instrument<R, F>(&self, call: &CallSite, summary: Option<SummaryRequest>, f: F) -> R
    where
        R: ToTraceValue,
        F: FnOnce() -> R,
    {
        match summary {
            None => self.profile(call, f),
            Some(request) if self.config.summary_wraps_trace() => {
                self.summarize(request.clear_before, || self.profile(call, f))
            }
            Some(request) => self.profile(call, || self.summarize(request.clear_before, f)),
        }
    }
}

/// Pops its frame when dropped; logs the exit line if tracing is on
#[must_use = "dropping the guard immediately records ~0ms"]
pub struct FrameGuard<'a> {
    profiler: &'a Profiler,
    context: ContextId,
    /// Rendered on entry, only when tracing
    signature: Option<String>,
    outcome: Option<CallOutcome>,
}

impl FrameGuard<'_> {
    /// Record how the call ended and pop the frame
    pub fn finish<R: ToTraceValue + ?Sized>(mut self, result: &R) {
        if self.signature.is_some() {
            self.outcome = Some(CallOutcome::from_value(result));
        }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let depth = self.profiler.recorder.depth_in(self.context);
        let elapsed = self.profiler.recorder.pop_in(self.context).unwrap_or(0);

        if let Some(signature) = &self.signature {
            let outcome = self.outcome.take().unwrap_or(CallOutcome::Unwound);
            let line = self.profiler.exit_line(signature, &outcome, elapsed, depth);
            trace!(target: LOG_TARGET, "{}", line);
        }
    }
}

/// Logs the summary of its context when dropped
struct SummaryGuard<'a> {
    profiler: &'a Profiler,
    context: ContextId,
}

impl Drop for SummaryGuard<'_> {
    fn drop(&mut self) {
        if self.profiler.config.enabled && log_enabled!(target: LOG_TARGET, Level::Debug) {
            debug!(target: LOG_TARGET, "{}", self.profiler.render_in(self.context));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::recorder::ManualClock;

    fn profiler(mode: Mode) -> (Profiler, ManualClock) {
        let clock = ManualClock::new();
        let config = ProfilingConfig::new().with_enabled(true).with_mode(mode);
        (Profiler::with_clock(config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_profile_records_nested_calls() {
        let (profiler, clock) = profiler(Mode::Plain);
        profiler.clear();
        let outer = CallSite::new("A.run", vec![]);
        let inner = CallSite::new("B.step", vec![]);

        let value = profiler.profile(&outer, || {
            clock.advance(5);
            profiler.profile(&inner, || {
                clock.advance(10);
                7u32
            })
        });

        assert_eq!(value, 7);
        assert_eq!(profiler.depth(), 0);

        let summary = profiler.summary();
        assert_eq!(summary.total_millis, 25);
        assert_eq!(summary.rows[0].identity, "B.step");
        assert_eq!(summary.rows[0].depth, 1);
        assert_eq!(summary.rows[1].total_millis, 15);
        profiler.release();
    }

    #[test]
    fn test_disabled_profiler_records_nothing() {
        let profiler = Profiler::new(ProfilingConfig::new());
        let call = CallSite::new("A.run", vec![]);

        assert_eq!(profiler.profile(&call, || 3), 3);
        assert!(profiler.summary().is_empty());
        profiler.release();
    }

    #[test]
    fn test_ignored_identity_records_nothing() {
        let config = ProfilingConfig::new()
            .with_enabled(true)
            .with_ignore("A.skip".parse().unwrap());
        let profiler = Profiler::new(config);

        profiler.profile(&CallSite::new("A.skip", vec![]), || ());
        profiler.profile(&CallSite::new("A.keep", vec![]), || ());

        let summary = profiler.summary();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].identity, "A.keep");
        profiler.release();
    }

    #[test]
    fn test_error_result_is_returned_untouched() {
        let (profiler, _clock) = profiler(Mode::Plain);
        let call = CallSite::new("A.fail", vec![]);

        let result: Result<u8, String> = profiler.profile(&call, || Err("nope".to_string()));

        assert_eq!(result, Err("nope".to_string()));
        assert_eq!(profiler.depth(), 0);
        assert_eq!(profiler.summary().rows[0].count, 1);
        profiler.release();
    }

    #[test]
    fn test_trace_lines() {
        let (profiler, _clock) = profiler(Mode::Tree);
        let call = CallSite::new("A.run", vec![TraceValue::text("x")]);

        assert_eq!(profiler.trace_entry_line(&call, 1), "┌ A.run(x)");
        let outcome = CallOutcome::from_value(&42u32);
        assert_eq!(
            profiler.trace_line(&call, &outcome, 12, 2),
            "├─ A.run(x) returned 42 - execution time: 12 ms"
        );
        assert_eq!(
            profiler.trace_line(&call, &CallOutcome::from_value(&()), 0, 1),
            "└ A.run(x) returned void - execution time: 0 ms"
        );
        assert_eq!(
            profiler.trace_line(&call, &CallOutcome::Unwound, 3, 1),
            "└ A.run(x) returned [no return value obtained] - execution time: 3 ms"
        );
    }

    #[test]
    fn test_failed_trace_line() {
        let (profiler, _clock) = profiler(Mode::Plain);
        let call = CallSite::new("A.run", vec![]);
        let result: Result<(), String> = Err("disk full".to_string());

        assert_eq!(
            profiler.trace_line(&call, &CallOutcome::from_value(&result), 4, 1),
            "A.run() failed with [disk full] - execution time: 4 ms"
        );
    }

    #[test]
    fn test_verbose_trace_line() {
        let (profiler, _clock) = profiler(Mode::Verbose);
        let call = CallSite::new("A.run", vec![]);

        assert_eq!(
            profiler.trace_line(&call, &CallOutcome::from_value(&1u8), 2, 1),
            "\nA.run()\n returned 1\n - execution time: 2 ms"
        );
    }

    #[test]
    fn test_summarize_clears_before() {
        let (profiler, clock) = profiler(Mode::Plain);
        profiler.profile(&CallSite::new("Old.call", vec![]), || clock.advance(3));

        profiler.summarize(true, || {
            profiler.profile(&CallSite::new("New.call", vec![]), || clock.advance(4))
        });

        let summary = profiler.summary();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].identity, "New.call");
        profiler.release();
    }

    #[test]
    fn test_instrument_summary_wraps_trace() {
        let (profiler, clock) = profiler(Mode::Plain);
        let call = CallSite::new("Job.run", vec![]);

        profiler.instrument(&call, Some(SummaryRequest { clear_before: true }), || {
            clock.advance(8)
        });

        let summary = profiler.summary();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.total_millis, 8);
        profiler.release();
    }

    #[test]
    fn test_call_site_resolves_identity() {
        use crate::formatter::{ProxiedTarget, TargetDescriptor};

        let (profiler, _clock) = profiler(Mode::Plain);
        let repository = TargetDescriptor::proxy(ProxiedTarget::Known("SimpleJpaRepository".into()))
            .with_interface("OrderRepository");

        let call = profiler.call_site(Some(&repository), "findAll", vec![]);
        assert_eq!(call.identity, "OrderRepository.findAll");

        let free = profiler.call_site(None, "main", vec![]);
        assert_eq!(free.identity, "[no target].main");
    }
}
