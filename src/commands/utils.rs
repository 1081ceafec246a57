/// Display version information
pub fn display_version() {
    println!("Call Profiler v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Call-tree tracing and wall-clock profiling for instrumented method calls.");
}
