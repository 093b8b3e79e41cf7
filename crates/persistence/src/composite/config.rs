//! Configuration for the failover layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Health monitor timing.
///
/// A probe is retried up to `attempts` times with `retry_delay` between
/// attempts. While any backend of a dual configuration remains down the
/// monitor checks again every `recheck_interval`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Probe attempts per backend per check.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay between failed probe attempts.
    #[serde(with = "humantime_serde", default = "default_retry_delay")]
    pub retry_delay: Duration,

    /// Delay before re-checking a degraded dual configuration.
    #[serde(with = "humantime_serde", default = "default_recheck_interval")]
    pub recheck_interval: Duration,
}

fn default_attempts() -> u32 {
    5
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_recheck_interval() -> Duration {
    Duration::from_secs(2)
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            retry_delay: default_retry_delay(),
            recheck_interval: default_recheck_interval(),
        }
    }
}

impl HealthConfig {
    /// Sets the number of probe attempts.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the delay between probe attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the re-check interval.
    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }
}

pub(crate) mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
