// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::DeploymentOutcome;
use crate::provider::{EnvironmentStatus, HealthDetail};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => self.emit_stdout("success", message),
        }
    }

    /// Print a warning. Shown in every mode.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => self.emit_stderr("warning", message),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.emit_stderr("error", message),
        }
    }

    /// Print the final deployment outcome.
    pub fn outcome(&self, outcome: &DeploymentOutcome) {
        match self.mode {
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(&OutcomeEvent {
                    event: "outcome",
                    outcome,
                }) {
                    println!("{json}");
                }
            }
            OutputMode::Normal | OutputMode::Quiet => {
                let status = outcome
                    .final_status
                    .as_ref()
                    .map(|s| format!(" [{s}]"))
                    .unwrap_or_default();
                let reason = outcome
                    .reason
                    .as_deref()
                    .map(|r| format!(": {r}"))
                    .unwrap_or_default();
                let line = format!(
                    "Deployment {} after {} poll(s){reason}{status}",
                    outcome.result, outcome.polls
                );
                if outcome.is_success() {
                    self.success(&line);
                } else {
                    eprintln!("{line}");
                }
            }
        }
    }

    /// Print a one-shot environment snapshot.
    pub fn environment(&self, status: &EnvironmentStatus, health: Option<&HealthDetail>) {
        match self.mode {
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(&StatusEvent {
                    event: "status",
                    status,
                    health,
                }) {
                    println!("{json}");
                }
            }
            OutputMode::Normal | OutputMode::Quiet => {
                println!("{status}");
                if let Some(detail) = health {
                    if let Some(health_status) = &detail.health_status {
                        println!("  health status: {health_status}");
                    }
                    for cause in &detail.causes {
                        println!("  cause: {cause}");
                    }
                }
            }
        }
    }

    fn emit_stdout(&self, event: &str, message: &str) {
        if let Ok(json) = serde_json::to_string(&self.event(event, message)) {
            println!("{json}");
        }
    }

    fn emit_stderr(&self, event: &str, message: &str) {
        if let Ok(json) = serde_json::to_string(&self.event(event, message)) {
            eprintln!("{json}");
        }
    }

    fn event<'a>(&self, event: &'a str, message: &'a str) -> JsonEvent<'a> {
        JsonEvent {
            event,
            message,
            duration_secs: self.duration(),
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct OutcomeEvent<'a> {
    event: &'a str,
    #[serde(flatten)]
    outcome: &'a DeploymentOutcome,
}

#[derive(Serialize)]
struct StatusEvent<'a> {
    event: &'a str,
    status: &'a EnvironmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    health: Option<&'a HealthDetail>,
}
