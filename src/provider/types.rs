// ABOUTME: Provider-neutral snapshots of Elastic Beanstalk state.
// ABOUTME: Environment status, health, events, and application versions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::types::{ApplicationName, EnvironmentName, VersionLabel};

/// Health color reported for an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Health {
    Green,
    Yellow,
    Red,
    Grey,
    Unknown(String),
}

impl Health {
    /// Parse the provider's wire value.
    pub fn from_provider(value: &str) -> Self {
        match value {
            "Green" => Health::Green,
            "Yellow" => Health::Yellow,
            "Red" => Health::Red,
            "Grey" => Health::Grey,
            other => Health::Unknown(other.to_string()),
        }
    }

    /// Green or Yellow: serving traffic.
    pub fn is_serving(&self) -> bool {
        matches!(self, Health::Green | Health::Yellow)
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Green => f.write_str("Green"),
            Health::Yellow => f.write_str("Yellow"),
            Health::Red => f.write_str("Red"),
            Health::Grey => f.write_str("Grey"),
            Health::Unknown(s) => f.write_str(s),
        }
    }
}

/// Operational status of an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Status {
    Launching,
    Updating,
    Ready,
    Aborting,
    LinkingFrom,
    LinkingTo,
    Terminating,
    Terminated,
    Unknown(String),
}

impl Status {
    /// Parse the provider's wire value.
    pub fn from_provider(value: &str) -> Self {
        match value {
            "Launching" => Status::Launching,
            "Updating" => Status::Updating,
            "Ready" => Status::Ready,
            "Aborting" => Status::Aborting,
            "LinkingFrom" => Status::LinkingFrom,
            "LinkingTo" => Status::LinkingTo,
            "Terminating" => Status::Terminating,
            "Terminated" => Status::Terminated,
            other => Status::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Launching => "Launching",
            Status::Updating => "Updating",
            Status::Ready => "Ready",
            Status::Aborting => "Aborting",
            Status::LinkingFrom => "LinkingFrom",
            Status::LinkingTo => "LinkingTo",
            Status::Terminating => "Terminating",
            Status::Terminated => "Terminated",
            Status::Unknown(s) => s,
        };
        f.write_str(s)
    }
}

/// Snapshot of an environment as last described by the provider.
///
/// This mirrors remote state; nothing in this crate mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentStatus {
    pub environment_name: String,
    pub health: Health,
    pub status: Status,
    pub current_version_label: Option<String>,
}

impl EnvironmentStatus {
    /// Ready, serving, and running exactly `version`.
    pub fn is_stable_ready(&self, version: &VersionLabel) -> bool {
        self.status == Status::Ready && self.health.is_serving() && self.runs(version)
    }

    /// Whether the environment currently runs `version`.
    pub fn runs(&self, version: &VersionLabel) -> bool {
        self.current_version_label.as_deref() == Some(version.as_str())
    }
}

impl fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: status={} health={} version={}",
            self.environment_name,
            self.status,
            self.health,
            self.current_version_label.as_deref().unwrap_or("-")
        )
    }
}

/// Enhanced health detail. Only available when enhanced health reporting is on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthDetail {
    pub health_status: Option<String>,
    pub color: Option<String>,
    pub causes: Vec<String>,
}

/// Severity of an environment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EventSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl EventSeverity {
    pub fn from_provider(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "TRACE" => EventSeverity::Trace,
            "DEBUG" => EventSeverity::Debug,
            "WARN" => EventSeverity::Warn,
            "ERROR" => EventSeverity::Error,
            "FATAL" => EventSeverity::Fatal,
            _ => EventSeverity::Info,
        }
    }
}

/// One entry from the environment's event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentEvent {
    pub date: DateTime<Utc>,
    pub severity: EventSeverity,
    pub message: String,
    pub version_label: Option<String>,
}

impl EnvironmentEvent {
    /// ERROR and FATAL events mark a failed or aborted update.
    pub fn is_failure(&self) -> bool {
        self.severity >= EventSeverity::Error
    }
}

/// Processing state of an application version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VersionStatus {
    Processed,
    Unprocessed,
    Processing,
    Building,
    Failed,
    Unknown(String),
}

impl VersionStatus {
    pub fn from_provider(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "PROCESSED" => VersionStatus::Processed,
            "UNPROCESSED" => VersionStatus::Unprocessed,
            "PROCESSING" => VersionStatus::Processing,
            "BUILDING" => VersionStatus::Building,
            "FAILED" => VersionStatus::Failed,
            other => VersionStatus::Unknown(other.to_string()),
        }
    }

    /// The version can be deployed.
    pub fn is_usable(&self) -> bool {
        matches!(self, VersionStatus::Processed | VersionStatus::Unprocessed)
    }
}

/// Location of an uploaded source bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBundle {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for SourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// A registered application version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationVersion {
    pub application_name: String,
    pub version_label: String,
    pub description: Option<String>,
    pub source_bundle: Option<SourceBundle>,
    pub status: VersionStatus,
}

/// Parameters for registering a new application version.
#[derive(Debug, Clone)]
pub struct NewApplicationVersion<'a> {
    pub application_name: &'a ApplicationName,
    pub version_label: &'a VersionLabel,
    pub description: &'a str,
    pub source_bundle: SourceBundle,
}

/// Addresses one environment of one application.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentRef<'a> {
    pub application_name: &'a ApplicationName,
    pub environment_name: &'a EnvironmentName,
}
