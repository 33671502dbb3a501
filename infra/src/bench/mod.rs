//! Connection pool tuning benchmark
//!
//! Runs the same insert across N concurrent workers sharing one pool, for a
//! series of pool configurations, and reports throughput and latency per
//! configuration. Queuing on an exhausted pool, connection reuse and
//! connection expiry are all left to SQLx; the harness only measures.

mod report;
mod runner;
mod scenario;

pub use report::{percentile, BenchReport};
pub use runner::{run_scenario, run_suite, run_workers, Budget, BenchSettings};
pub use scenario::{max_idle_suite, max_lifetime_suite, max_open_suite, BenchScenario, Suite};
