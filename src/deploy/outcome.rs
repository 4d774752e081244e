// ABOUTME: The result of one deployment run.
// ABOUTME: Maps terminal watch states to a result and a process exit code.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::provider::EnvironmentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentResult {
    Success,
    Failed,
    TimedOut,
}

impl DeploymentResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentResult::Success => "success",
            DeploymentResult::Failed => "failed",
            DeploymentResult::TimedOut => "timed_out",
        }
    }

    /// Exit code reported by the binary. 1 is reserved for fatal errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeploymentResult::Success => 0,
            DeploymentResult::Failed => 2,
            DeploymentResult::TimedOut => 3,
        }
    }
}

impl fmt::Display for DeploymentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentOutcome {
    pub result: DeploymentResult,
    /// Last observed environment status. `None` when nothing was polled.
    pub final_status: Option<EnvironmentStatus>,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    pub polls: u32,
    /// Why the deployment did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DeploymentOutcome {
    /// Outcome of a run that did not wait for the environment.
    pub fn not_watched() -> Self {
        DeploymentOutcome {
            result: DeploymentResult::Success,
            final_status: None,
            elapsed: Duration::ZERO,
            polls: 0,
            reason: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == DeploymentResult::Success
    }
}
