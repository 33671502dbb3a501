//! Benchmark results

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Throughput and latency observed for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    /// Scenario label
    pub label: String,
    /// Pool knobs, rendered
    pub pool: String,
    /// Concurrent workers
    pub workers: usize,
    /// Completed operations
    pub ops: u64,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
    /// Mean latency of one operation
    pub mean_latency: Duration,
    pub p50_latency: Duration,
    pub p99_latency: Duration,
    pub max_latency: Duration,
    /// Largest number of open connections seen during the run
    pub peak_connections: u32,
}

impl BenchReport {
    /// Build a report from raw per-operation latencies
    pub fn from_samples(
        label: impl Into<String>,
        pool: impl Into<String>,
        workers: usize,
        elapsed: Duration,
        mut latencies: Vec<Duration>,
        peak_connections: u32,
    ) -> Self {
        latencies.sort_unstable();

        let ops = latencies.len() as u64;
        let total_nanos: u128 = latencies.iter().map(Duration::as_nanos).sum();
        let mean_latency = if ops == 0 {
            Duration::ZERO
        } else {
            let mean = total_nanos / u128::from(ops);
            Duration::from_nanos(u64::try_from(mean).unwrap_or(u64::MAX))
        };

        Self {
            label: label.into(),
            pool: pool.into(),
            workers,
            ops,
            elapsed,
            mean_latency,
            p50_latency: percentile(&latencies, 0.50),
            p99_latency: percentile(&latencies, 0.99),
            max_latency: latencies.last().copied().unwrap_or_default(),
            peak_connections,
        }
    }

    /// Operations completed per second of wall-clock time
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.ops as f64 / secs
        }
    }

    /// Wall-clock nanoseconds per operation across all workers
    pub fn ns_per_op(&self) -> u128 {
        if self.ops == 0 {
            0
        } else {
            self.elapsed.as_nanos() / self.ops as u128
        }
    }
}

impl std::fmt::Display for BenchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<24} {:>8} ops {:>12} ns/op {:>10.1} ops/s  mean={:?} p50={:?} p99={:?} peak_conns={}",
            self.label,
            self.ops,
            self.ns_per_op(),
            self.ops_per_sec(),
            self.mean_latency,
            self.p50_latency,
            self.p99_latency,
            self.peak_connections
        )
    }
}

/// Nearest-rank percentile of an ascending slice, zero when empty
pub fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_percentile() {
        let sorted: Vec<_> = (1..=100).map(ms).collect();
        assert_eq!(percentile(&sorted, 0.0), ms(1));
        assert_eq!(percentile(&sorted, 0.5), ms(51));
        assert_eq!(percentile(&sorted, 0.99), ms(99));
        assert_eq!(percentile(&sorted, 1.0), ms(100));
        assert_eq!(percentile(&[], 0.5), Duration::ZERO);
    }

    #[test]
    fn test_from_samples() {
        let report = BenchReport::from_samples(
            "max_open=2",
            "max_open=2 max_idle=2 max_lifetime=unlimited",
            4,
            Duration::from_secs(2),
            vec![ms(30), ms(10), ms(20), ms(40)],
            2,
        );

        assert_eq!(report.ops, 4);
        assert_eq!(report.mean_latency, ms(25));
        assert_eq!(report.p50_latency, ms(30));
        assert_eq!(report.max_latency, ms(40));
        assert_eq!(report.ops_per_sec(), 2.0);
        assert_eq!(report.ns_per_op(), 500_000_000);
    }

    #[test]
    fn test_mean_is_computed_in_nanoseconds() {
        let samples = vec![
            Duration::from_nanos(1),
            Duration::from_nanos(2),
            Duration::from_secs(3),
        ];
        let report = BenchReport::from_samples("mean", "", 1, Duration::from_secs(3), samples, 1);
        assert_eq!(report.mean_latency, Duration::from_nanos(1_000_000_001));

        // Long samples add up past u64 nanoseconds without wrapping
        let samples = vec![Duration::from_secs(10_000_000_000); 3];
        let report = BenchReport::from_samples("long", "", 1, Duration::from_secs(1), samples, 1);
        assert_eq!(report.mean_latency, Duration::from_secs(10_000_000_000));
    }

    #[test]
    fn test_empty_run() {
        let report = BenchReport::from_samples("empty", "", 1, Duration::ZERO, Vec::new(), 0);
        assert_eq!(report.ops, 0);
        assert_eq!(report.mean_latency, Duration::ZERO);
        assert_eq!(report.ops_per_sec(), 0.0);
        assert_eq!(report.ns_per_op(), 0);
    }

    #[test]
    fn test_display_contains_key_numbers() {
        let report = BenchReport::from_samples("max_idle=0", "", 2, Duration::from_secs(1), vec![ms(5); 10], 2);
        let line = report.to_string();
        assert!(line.starts_with("max_idle=0"));
        assert!(line.contains("100000000 ns/op"));
        assert!(line.contains("peak_conns=2"));
    }
}
