//! Call Profiler
//!
//! Call-tree tracing and wall-clock profiling for instrumented method calls.
//!
//! A host application wraps the calls it cares about with
//! [`Profiler::profile`]. Each execution context (one per thread by default)
//! gets its own call stack and statistics; trace lines go to the `log`
//! facade at `trace` level and summary tables at `debug` level, both under
//! the `call_profiler` target.
//!
//! ## Getting Started
//!
//! ```ignore
//! use call_profiler::{CallSite, Mode, Profiler, ProfilingConfig};
//!
//! let profiler = Profiler::new(ProfilingConfig::new().with_enabled(true).with_mode(Mode::Tree));
//! let call = CallSite::new("OrderService.process", vec![]);
//! let total = profiler.summarize(true, || profiler.profile(&call, || 42u32));
//! println!("{}", profiler.render());
//! ```

pub mod commands;
pub mod config;
pub mod formatter;
pub mod profiler;
pub mod recorder;
pub mod summary;
pub mod utils;

pub use config::{IgnoreList, Mode, ProfilingConfig};
pub use formatter::{CallTarget, TargetDescriptor, ToTraceValue, TraceValue};
pub use profiler::{CallOutcome, CallSite, FrameGuard, Profiler, SummaryRequest};
pub use recorder::{CallStackRecorder, ContextId};
pub use summary::{Summary, SummaryRow};
