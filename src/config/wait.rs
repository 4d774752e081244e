// ABOUTME: Timing configuration for the deployment watcher and version processing.
// ABOUTME: Durations use humantime syntax ("20m", "8s") in the config file.

use serde::Deserialize;
use std::time::Duration;

/// How long and how often to poll the environment after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(20 * 60)
}

fn default_interval() -> Duration {
    Duration::from_secs(8)
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            timeout: default_timeout(),
            interval: default_interval(),
        }
    }
}

/// Bounded wait for a freshly created application version to finish processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        ProcessingConfig {
            timeout: Duration::from_secs(5 * 60),
            interval: Duration::from_secs(5),
        }
    }
}
