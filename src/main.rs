//! Call Profiler CLI
//!
//! Runs an instrumented demo workload and prints its call summaries.

use anyhow::{Context, Result};
use call_profiler::commands::{display_version, execute_demo, validate_args, DemoArgs};
use call_profiler::{IgnoreList, Mode};
use clap::{Parser, Subcommand};
use env_logger::Env;

/// Call Profiler - call-tree tracing for instrumented method calls
#[derive(Parser, Debug)]
#[command(name = "call-profiler")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable trace lines (sets the default log filter to trace)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a synthetic order workload under the profiler
    Demo {
        /// Number of worker threads
        #[arg(short, long, default_value = "2")]
        threads: usize,

        /// Requests handled per worker
        #[arg(short, long, default_value = "3")]
        requests: usize,

        /// Display mode: PLAIN, TREE or VERBOSE
        #[arg(short, long, default_value = "TREE", env = "CALL_PROFILER_MODE")]
        mode: String,

        /// Max characters per rendered value (0 disables truncation)
        #[arg(long, default_value = "100")]
        truncate: usize,

        /// Comma-separated Target.method identities to skip
        #[arg(long, default_value = "", env = "CALL_PROFILER_IGNORE")]
        ignore: String,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "trace" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Demo {
            threads,
            requests,
            mode,
            truncate,
            ignore,
        } => {
            let mode: Mode = mode.parse().context("Invalid --mode")?;
            let ignore: IgnoreList = match ignore.parse() {
                Ok(list) => list,
                Err(never) => match never {},
            };

            let args = DemoArgs {
                threads,
                requests,
                mode,
                truncate: (truncate > 0).then_some(truncate),
                ignore,
            };

            validate_args(&args)?;
            execute_demo(args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
