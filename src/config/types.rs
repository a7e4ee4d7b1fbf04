use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the dashboard client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,

    #[serde(default = "default_idle_divisor")]
    pub idle_divisor: u32,

    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,

    #[serde(default = "default_timeout_margin_secs")]
    pub timeout_margin_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub trigger: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            idle_divisor: default_idle_divisor(),
            wait_secs: default_wait_secs(),
            timeout_margin_secs: default_timeout_margin_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            trigger: None,
        }
    }
}

fn default_api_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> u32 {
    5
}

fn default_idle_divisor() -> u32 {
    5
}

fn default_wait_secs() -> u64 {
    55
}

fn default_timeout_margin_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Intervals the sync engine schedules with, all derived from the base poll interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub poll_interval: Duration,
    pub backoff_multiplier: u32,
    pub idle_divisor: u32,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            backoff_multiplier: default_backoff_multiplier(),
            idle_divisor: default_idle_divisor(),
        }
    }
}

impl PollTiming {
    /// Delay before retrying after a failed poll.
    pub fn backoff_interval(&self) -> Duration {
        self.poll_interval * self.backoff_multiplier.max(1)
    }

    /// Delay between readiness checks while no category is known.
    pub fn idle_interval(&self) -> Duration {
        self.poll_interval / self.idle_divisor.max(1)
    }
}

impl Config {
    pub fn timing(&self) -> PollTiming {
        PollTiming {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            backoff_multiplier: self.backoff_multiplier,
            idle_divisor: self.idle_divisor,
        }
    }

    /// Server-side blocking bound sent as the `wait` parameter.
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// Client-side timeout for a long-poll: the blocking bound plus a safety margin.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_secs.saturating_add(self.timeout_margin_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
