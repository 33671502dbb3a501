//! Pool configurations compared by the benchmark

use serde::{Deserialize, Serialize};
use std::time::Duration;

use dt_shared::config::PoolConfig;

/// One pool configuration under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchScenario {
    /// Human readable name, e.g. `max_open=5`
    pub label: String,
    /// Pool knobs applied for this run
    pub pool: PoolConfig,
}

impl BenchScenario {
    pub fn new(label: impl Into<String>, pool: PoolConfig) -> Self {
        Self {
            label: label.into(),
            pool,
        }
    }
}

/// Family of scenarios varying a single knob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Suite {
    /// Max open connections: 1, 2, 5, 10, unlimited
    MaxOpen,
    /// Max idle connections: 0, 1, 2, 5, 10
    MaxIdle,
    /// Connection lifetime: unlimited, 1000ms, 500ms, 50ms, 10ms
    MaxLifetime,
}

impl Suite {
    /// Every suite, in the order they are usually run
    pub const ALL: [Suite; 3] = [Suite::MaxOpen, Suite::MaxIdle, Suite::MaxLifetime];

    pub fn name(&self) -> &'static str {
        match self {
            Suite::MaxOpen => "max-open",
            Suite::MaxIdle => "max-idle",
            Suite::MaxLifetime => "max-lifetime",
        }
    }

    /// Scenarios of this suite
    ///
    /// Only the knob under test is set; the others keep pool defaults.
    pub fn scenarios(&self) -> Vec<BenchScenario> {
        match self {
            Suite::MaxOpen => {
                let mut scenarios: Vec<_> = [1, 2, 5, 10]
                    .into_iter()
                    .map(|n| {
                        BenchScenario::new(
                            format!("max_open={}", n),
                            PoolConfig::default().with_max_open(n),
                        )
                    })
                    .collect();
                scenarios.push(BenchScenario::new("max_open=unlimited", PoolConfig::default()));
                scenarios
            }
            Suite::MaxIdle => [0, 1, 2, 5, 10]
                .into_iter()
                .map(|n| {
                    BenchScenario::new(
                        format!("max_idle={}", n),
                        PoolConfig::default().with_max_idle(n),
                    )
                })
                .collect(),
            Suite::MaxLifetime => {
                let mut scenarios = vec![BenchScenario::new(
                    "max_lifetime=unlimited",
                    PoolConfig::default(),
                )];
                scenarios.extend([1000, 500, 50, 10].into_iter().map(|ms| {
                    BenchScenario::new(
                        format!("max_lifetime={}ms", ms),
                        PoolConfig::default().with_max_lifetime(Duration::from_millis(ms)),
                    )
                }));
                scenarios
            }
        }
    }
}

/// Max open connections: 1, 2, 5, 10, unlimited
pub fn max_open_suite() -> Vec<BenchScenario> {
    Suite::MaxOpen.scenarios()
}

/// Max idle connections: 0, 1, 2, 5, 10
pub fn max_idle_suite() -> Vec<BenchScenario> {
    Suite::MaxIdle.scenarios()
}

/// Connection lifetime: unlimited, 1000ms, 500ms, 50ms, 10ms
pub fn max_lifetime_suite() -> Vec<BenchScenario> {
    Suite::MaxLifetime.scenarios()
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "max-open" | "open" => Ok(Suite::MaxOpen),
            "max-idle" | "idle" => Ok(Suite::MaxIdle),
            "max-lifetime" | "lifetime" => Ok(Suite::MaxLifetime),
            _ => Err(format!("Unknown benchmark suite: {}", s)),
        }
    }
}
