// ABOUTME: Polls an environment after an update until it is stable, degraded, or out of time.
// ABOUTME: Each poll reads status, enhanced health, and events emitted since the update.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::error::DeployError;
use super::outcome::{DeploymentOutcome, DeploymentResult};
use crate::config::{DeploymentRequest, WaitConfig};
use crate::provider::{
    EnvironmentEvent, EnvironmentOps, EnvironmentRef, EnvironmentStatus, EventSeverity, Health,
    HealthDetail, ProviderError, Status,
};
use crate::types::{EnvironmentName, VersionLabel};

/// Watcher states. `Polling` is the only non-terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Polling,
    Stable,
    Degraded,
    TimedOut,
}

impl WatchState {
    /// Result for a terminal state. `None` while polling.
    pub fn result(&self) -> Option<DeploymentResult> {
        match self {
            WatchState::Polling => None,
            WatchState::Stable => Some(DeploymentResult::Success),
            WatchState::Degraded => Some(DeploymentResult::Failed),
            WatchState::TimedOut => Some(DeploymentResult::TimedOut),
        }
    }
}

/// Classify one observation of the environment. Never yields `TimedOut`.
pub fn classify(
    status: &EnvironmentStatus,
    failure_event_seen: bool,
    version: &VersionLabel,
) -> WatchState {
    if status.health == Health::Red || failure_event_seen {
        return WatchState::Degraded;
    }
    match status.status {
        Status::Aborting | Status::Terminating | Status::Terminated => WatchState::Degraded,
        _ if status.is_stable_ready(version) => WatchState::Stable,
        // Ready on another label: the platform rolled the update back.
        Status::Ready if status.health.is_serving() => WatchState::Degraded,
        _ => WatchState::Polling,
    }
}

/// Poll until a terminal state is reached.
///
/// `requested_at` bounds the event window; only events emitted at or after it
/// are considered. The maximum wait counts from the first poll.
pub async fn watch<R: EnvironmentOps + ?Sized>(
    runtime: &R,
    request: &DeploymentRequest,
    requested_at: DateTime<Utc>,
    wait: &WaitConfig,
) -> Result<DeploymentOutcome, DeployError> {
    let environment = request.environment();
    let environment_name = request.environment_name();
    let label = request.version_label();
    let started = Instant::now();

    let mut polls: u32 = 0;
    let mut last_status: Option<EnvironmentStatus> = None;
    let mut cursor = EventCursor::new(requested_at);
    let mut failure: Option<String> = None;

    loop {
        polls += 1;

        let observed = match runtime.describe_environment(environment).await {
            Ok(status) => Some(status),
            Err(err) if err.is_transient() => {
                tracing::warn!(environment = %environment_name, error = %err, "environment poll failed");
                None
            }
            Err(source) => return Err(describe_error(environment_name, source)),
        };

        log_health(runtime, environment_name).await;

        match runtime.describe_events(environment, cursor.since()).await {
            Ok(events) => {
                for event in cursor.advance(&events) {
                    log_event(event);
                    if event.is_failure() && failure.is_none() {
                        failure = Some(event.message.clone());
                    }
                }
            }
            Err(err) if err.is_transient() => {
                tracing::warn!(environment = %environment_name, error = %err, "event poll failed");
            }
            Err(source) => return Err(describe_error(environment_name, source)),
        }

        let state = match &observed {
            Some(status) => classify(status, failure.is_some(), label),
            None if failure.is_some() => WatchState::Degraded,
            None => WatchState::Polling,
        };
        if let Some(status) = observed {
            last_status = Some(status);
        }

        let elapsed = started.elapsed();
        let state = match state {
            WatchState::Polling if elapsed > wait.timeout => WatchState::TimedOut,
            other => other,
        };

        if let Some(result) = state.result() {
            let reason = match state {
                WatchState::Degraded => Some(degraded_reason(
                    last_status.as_ref(),
                    failure.as_deref(),
                    label,
                )),
                WatchState::TimedOut => Some(format!(
                    "no terminal state after {}",
                    humantime_serde::re::humantime::format_duration(wait.timeout)
                )),
                _ => None,
            };
            tracing::info!(
                environment = %environment_name,
                result = %result,
                polls,
                elapsed_secs = elapsed.as_secs(),
                "deployment watch finished"
            );
            return Ok(DeploymentOutcome {
                result,
                final_status: last_status,
                elapsed,
                polls,
                reason,
            });
        }

        match &last_status {
            Some(status) => tracing::info!(
                environment = %environment_name,
                status = %status.status,
                health = %status.health,
                version = status.current_version_label.as_deref().unwrap_or("-"),
                poll = polls,
                elapsed_secs = elapsed.as_secs(),
                "waiting for deployment"
            ),
            None => tracing::info!(
                environment = %environment_name,
                poll = polls,
                elapsed_secs = elapsed.as_secs(),
                "waiting for deployment"
            ),
        }
        tokio::time::sleep(wait.interval).await;
    }
}

/// Read the environment once, with enhanced health when available.
pub async fn snapshot<R: EnvironmentOps + ?Sized>(
    runtime: &R,
    environment: EnvironmentRef<'_>,
) -> Result<(EnvironmentStatus, Option<HealthDetail>), DeployError> {
    let environment_name = environment.environment_name;
    let status = runtime
        .describe_environment(environment)
        .await
        .map_err(|source| describe_error(environment_name, source))?;
    let health = match runtime.describe_environment_health(environment_name).await {
        Ok(detail) => detail,
        Err(err) => {
            tracing::debug!(environment = %environment_name, error = %err, "health detail unavailable");
            None
        }
    };
    Ok((status, health))
}

fn describe_error(environment: &EnvironmentName, source: ProviderError) -> DeployError {
    DeployError::EnvironmentDescribe {
        environment: environment.to_string(),
        source,
    }
}

/// Tracks which events were already reported across polls.
///
/// Event timestamps are not unique, so events at the newest seen timestamp
/// are remembered by message. A later event sharing that timestamp still counts.
#[derive(Debug)]
struct EventCursor {
    requested_at: DateTime<Utc>,
    last_at: Option<DateTime<Utc>>,
    at_last: Vec<String>,
}

impl EventCursor {
    fn new(requested_at: DateTime<Utc>) -> Self {
        Self {
            requested_at,
            last_at: None,
            at_last: Vec::new(),
        }
    }

    /// Start of the next query window. Inclusive, so ties are re-read.
    fn since(&self) -> DateTime<Utc> {
        self.last_at.unwrap_or(self.requested_at)
    }

    /// Events not yet seen, oldest first. The provider returns newest first.
    fn advance<'a>(&mut self, events: &'a [EnvironmentEvent]) -> Vec<&'a EnvironmentEvent> {
        let mut fresh = Vec::new();
        for event in events.iter().rev() {
            let unseen = match self.last_at {
                None => event.date >= self.requested_at,
                Some(last) if event.date == last => !self.at_last.contains(&event.message),
                Some(last) => event.date > last,
            };
            if !unseen {
                continue;
            }
            if self.last_at.is_some_and(|last| event.date == last) {
                self.at_last.push(event.message.clone());
            } else {
                self.last_at = Some(event.date);
                self.at_last = vec![event.message.clone()];
            }
            fresh.push(event);
        }
        fresh
    }
}

fn log_event(event: &EnvironmentEvent) {
    let version = event.version_label.as_deref().unwrap_or("-");
    match event.severity {
        EventSeverity::Error | EventSeverity::Fatal => {
            tracing::error!(at = %event.date, version, "{}", event.message)
        }
        EventSeverity::Warn => tracing::warn!(at = %event.date, version, "{}", event.message),
        _ => tracing::info!(at = %event.date, version, "{}", event.message),
    }
}

async fn log_health<R: EnvironmentOps + ?Sized>(runtime: &R, environment: &EnvironmentName) {
    match runtime.describe_environment_health(environment).await {
        Ok(Some(detail)) => tracing::debug!(
            environment = %environment,
            health_status = detail.health_status.as_deref().unwrap_or("-"),
            color = detail.color.as_deref().unwrap_or("-"),
            causes = ?detail.causes,
            "enhanced health"
        ),
        Ok(None) => {}
        Err(err) => {
            tracing::debug!(environment = %environment, error = %err, "health detail unavailable")
        }
    }
}

fn degraded_reason(
    status: Option<&EnvironmentStatus>,
    failure: Option<&str>,
    version: &VersionLabel,
) -> String {
    if let Some(message) = failure {
        return format!("update failed: {message}");
    }
    let Some(status) = status else {
        return "environment could not be observed".to_string();
    };
    if status.health == Health::Red {
        return format!("environment health is Red (status {})", status.status);
    }
    if status.status == Status::Ready && !status.runs(version) {
        return format!(
            "environment is Ready on {} instead of {version}",
            status.current_version_label.as_deref().unwrap_or("no version")
        );
    }
    format!("environment is {}", status.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: Status, health: Health, version: &str) -> EnvironmentStatus {
        EnvironmentStatus {
            environment_name: "demo-dev".to_string(),
            health,
            status,
            current_version_label: Some(version.to_string()),
        }
    }

    fn label() -> VersionLabel {
        VersionLabel::new("abc123").unwrap()
    }

    fn event_at(date: DateTime<Utc>, message: &str) -> EnvironmentEvent {
        EnvironmentEvent {
            date,
            severity: EventSeverity::Info,
            message: message.to_string(),
            version_label: None,
        }
    }

    fn messages(events: Vec<&EnvironmentEvent>) -> Vec<&str> {
        events.into_iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn cursor_reports_same_timestamp_event_once() {
        let start = Utc::now();
        let at = start + chrono::Duration::seconds(3);
        let mut cursor = EventCursor::new(start);

        assert_eq!(messages(cursor.advance(&[event_at(at, "a")])), ["a"]);
        assert_eq!(cursor.since(), at);

        let second = [event_at(at, "b"), event_at(at, "a")];
        assert_eq!(messages(cursor.advance(&second)), ["b"]);
        assert!(cursor.advance(&second).is_empty());
    }

    #[test]
    fn cursor_drops_events_before_the_update() {
        let start = Utc::now();
        let mut cursor = EventCursor::new(start);
        let events = [
            event_at(start + chrono::Duration::seconds(1), "new"),
            event_at(start - chrono::Duration::seconds(1), "old"),
        ];

        assert_eq!(messages(cursor.advance(&events)), ["new"]);
    }

    #[test]
    fn ready_green_on_label_is_stable() {
        let observed = status(Status::Ready, Health::Green, "abc123");
        assert_eq!(classify(&observed, false, &label()), WatchState::Stable);
    }

    #[test]
    fn yellow_counts_as_serving() {
        let observed = status(Status::Ready, Health::Yellow, "abc123");
        assert_eq!(classify(&observed, false, &label()), WatchState::Stable);
    }

    #[test]
    fn ready_on_other_label_is_degraded() {
        let observed = status(Status::Ready, Health::Green, "old");
        assert_eq!(classify(&observed, false, &label()), WatchState::Degraded);
        assert!(degraded_reason(Some(&observed), None, &label()).contains("old"));
    }

    #[test]
    fn updating_is_transitional() {
        let observed = status(Status::Updating, Health::Grey, "old");
        assert_eq!(classify(&observed, false, &label()), WatchState::Polling);
    }

    #[test]
    fn failure_event_wins_over_stable() {
        let observed = status(Status::Ready, Health::Green, "abc123");
        assert_eq!(classify(&observed, true, &label()), WatchState::Degraded);
    }

    #[test]
    fn terminal_states_map_to_results() {
        assert_eq!(WatchState::Polling.result(), None);
        assert_eq!(
            WatchState::Stable.result(),
            Some(DeploymentResult::Success)
        );
        assert_eq!(
            WatchState::Degraded.result(),
            Some(DeploymentResult::Failed)
        );
        assert_eq!(
            WatchState::TimedOut.result(),
            Some(DeploymentResult::TimedOut)
        );
    }
}
