//! Demo command implementation.
//!
//! The demo command:
//! 1. Builds a profiler from the CLI options
//! 2. Runs a synthetic order workload on worker threads
//! 3. Prints each worker's summary table

use crate::config::{IgnoreList, Mode, ProfilingConfig};
use crate::formatter::{ProxiedTarget, TargetDescriptor, ToTraceValue, TraceValue};
use crate::profiler::{Profiler, SummaryRequest};
use crate::summary::{render_table, Summary};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::thread;
use std::time::{Duration, Instant};

/// Arguments for the demo command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct DemoArgs {
    /// Number of worker threads (one execution context each)
    pub threads: usize,

    /// Requests handled per worker
    pub requests: usize,

    pub mode: Mode,

    pub truncate: Option<usize>,

    pub ignore: IgnoreList,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            threads: 2,
            requests: 3,
            mode: Mode::Tree,
            truncate: Some(100),
            ignore: IgnoreList::new(),
        }
    }
}

/// Validate demo arguments
///
/// **Public** - can be called before execute_demo for early validation
pub fn validate_args(args: &DemoArgs) -> Result<()> {
    if args.threads == 0 {
        anyhow::bail!("threads must be greater than 0");
    }

    if args.threads > 64 {
        anyhow::bail!("threads is too large (max 64)");
    }

    if args.requests == 0 {
        anyhow::bail!("requests must be greater than 0");
    }

    Ok(())
}

/// Execute the demo command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// One summary per worker, in worker order
pub fn execute_demo(args: DemoArgs) -> Result<Vec<Summary>> {
    let start_time = Instant::now();

    let config = ProfilingConfig::new()
        .with_enabled(true)
        .with_mode(args.mode)
        .with_truncate(args.truncate)
        .with_ignore(args.ignore.clone());

    info!(
        "Running demo workload: {} workers x {} requests ({} mode)",
        args.threads, args.requests, args.mode
    );

    let profiler = Profiler::new(config);
    let summaries = run_workers(&profiler, args.threads, args.requests)?;

    for summary in &summaries {
        println!("{}", render_table(summary, args.mode));
        if let Some(hottest) = summary.hottest() {
            info!(
                "{}: {} calls, hottest {} ({} ms)",
                summary.context,
                summary.call_count(),
                hottest.identity,
                hottest.total_millis
            );
        }
    }

    info!(
        "Demo completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(summaries)
}

/// Run the workload on named worker threads, one context each
fn run_workers(profiler: &Profiler, threads: usize, requests: usize) -> Result<Vec<Summary>> {
    thread::scope(|scope| {
        let handles = (0..threads)
            .map(|worker| {
                thread::Builder::new()
                    .name(format!("worker-{}", worker + 1))
                    .spawn_scoped(scope, move || {
                        let shop = Shop::new(profiler);
                        for request in 0..requests {
                            shop.handle_request(worker * requests + request);
                        }
                        let summary = profiler.summary();
                        profiler.release();
                        summary
                    })
                    .context("Failed to spawn worker thread")
            })
            .collect::<Result<Vec<_>>>()?;

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow!("Worker thread panicked"))
            })
            .collect()
    })
}

/*------------------------------------*\
 * Synthetic workload
\*------------------------------------*/

#[derive(Debug, Clone)]
struct Order {
    id: usize,
    items: usize,
}

impl ToTraceValue for Order {
    fn to_trace_value(&self) -> TraceValue {
        TraceValue::object("Order", format!("Order(id={}, items={})", self.id, self.items))
    }
}

/// Instrumented order handling, wired the way a host would wire it
struct Shop<'a> {
    profiler: &'a Profiler,
    controller: TargetDescriptor,
    service: TargetDescriptor,
    repository: TargetDescriptor,
}

impl<'a> Shop<'a> {
    fn new(profiler: &'a Profiler) -> Self {
        Self {
            profiler,
            controller: TargetDescriptor::new("OrderController"),
            service: TargetDescriptor::proxy(ProxiedTarget::Known("OrderServiceImpl".into()))
                .with_interface("OrderService"),
            repository: TargetDescriptor::proxy(ProxiedTarget::Known(
                "SimpleJpaRepository".into(),
            ))
            .with_interface("OrderRepository"),
        }
    }

    fn handle_request(&self, request_id: usize) {
        let request = TraceValue::request("POST", format!("/orders/{}", request_id));
        let call = self
            .profiler
            .call_site(Some(&self.controller), "create", vec![request]);

        let status = self.profiler.instrument(
            &call,
            Some(SummaryRequest {
                clear_before: false,
            }),
            || {
                let order = Order {
                    id: request_id,
                    items: request_id % 4 + 1,
                };
                match self.process(&order) {
                    Ok(_) => 201u16,
                    Err(_) => 422u16,
                }
            },
        );

        debug!("Request {} finished with status {}", request_id, status);
    }

    fn process(&self, order: &Order) -> Result<u64, String> {
        let call = self
            .profiler
            .call_site(Some(&self.service), "process", vec![order.to_trace_value()]);

        self.profiler.profile(&call, || {
            let existing = self.find_all();
            work(1);
            if order.items == 4 {
                return Err(format!("order {} exceeds the item limit", order.id));
            }
            Ok(existing.len() as u64 * 10 + order.items as u64)
        })
    }

    fn find_all(&self) -> Vec<Order> {
        let call = self
            .profiler
            .call_site(Some(&self.repository), "findAll", vec![]);

        self.profiler.profile(&call, || {
            work(2);
            (0..3).map(|id| Order { id, items: 1 }).collect()
        })
    }
}

fn work(millis: u64) {
    thread::sleep(Duration::from_millis(millis));
}
