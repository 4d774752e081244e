// ABOUTME: Test support utilities.
// ABOUTME: Scripted provider and image builder doubles plus request fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use beanstalk_deploy::build::{BuildError, ImageBuilder};
use beanstalk_deploy::config::{ContainerConfig, DeploymentRequest};
use beanstalk_deploy::provider::{
    ApplicationVersion, BundleOps, EnvironmentEvent, EnvironmentOps, EnvironmentRef,
    EnvironmentStatus, EventSeverity, Health, HealthDetail, NewApplicationVersion, ProviderError,
    SourceBundle, Status, VersionOps, VersionStatus,
};
use beanstalk_deploy::types::{ApplicationName, EnvironmentName, ImageRef, VersionLabel};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("beanstalk_deploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// Fixtures
// =============================================================================

pub const APPLICATION: &str = "demo";
pub const ENVIRONMENT: &str = "demo-dev";
pub const LABEL: &str = "abc123";
pub const BUCKET: &str = "versions-bucket";

pub fn label() -> VersionLabel {
    VersionLabel::new(LABEL).unwrap()
}

pub fn request() -> DeploymentRequest {
    DeploymentRequest::builder()
        .application_name(APPLICATION)
        .environment_name(ENVIRONMENT)
        .version_label(label())
        .version_description("GitHub Actions run #7")
        .version_bucket(BUCKET)
        .build()
        .unwrap()
}

pub fn env_status(status: Status, health: Health, version: &str) -> EnvironmentStatus {
    EnvironmentStatus {
        environment_name: ENVIRONMENT.to_string(),
        health,
        status,
        current_version_label: Some(version.to_string()),
    }
}

/// An event dated after any update requested during the test.
pub fn event(severity: EventSeverity, message: &str) -> EnvironmentEvent {
    EnvironmentEvent {
        date: Utc::now() + chrono::Duration::seconds(5),
        severity,
        message: message.to_string(),
        version_label: Some(LABEL.to_string()),
    }
}

pub fn version(label: &str, bundle: SourceBundle, status: VersionStatus) -> ApplicationVersion {
    ApplicationVersion {
        application_name: APPLICATION.to_string(),
        version_label: label.to_string(),
        description: None,
        source_bundle: Some(bundle),
        status,
    }
}

pub fn bundle(key: &str) -> SourceBundle {
    SourceBundle {
        bucket: BUCKET.to_string(),
        key: key.to_string(),
    }
}

// =============================================================================
// MockProvider
// =============================================================================

/// How many times each remote call was made.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Calls {
    pub describe_version: u32,
    pub create_version: u32,
    pub storage_location: u32,
    pub describe_environment: u32,
    pub describe_health: u32,
    pub describe_events: u32,
    pub update_environment: u32,
    pub put_bundle: u32,
}

/// Provider double driven by scripted responses.
///
/// Environment snapshots are returned in order; once the script runs out the
/// last snapshot repeats.
#[derive(Default)]
pub struct MockProvider {
    versions: Mutex<HashMap<String, ApplicationVersion>>,
    processing: Mutex<VecDeque<VersionStatus>>,
    created_status: Mutex<Option<VersionStatus>>,
    create_error: Mutex<Option<ProviderError>>,
    concurrent_version: Mutex<Option<ApplicationVersion>>,
    environments: Mutex<VecDeque<Result<EnvironmentStatus, ProviderError>>>,
    last_environment: Mutex<Option<EnvironmentStatus>>,
    events: Mutex<VecDeque<Result<Vec<EnvironmentEvent>, ProviderError>>>,
    health_error: Mutex<Option<ProviderError>>,
    update_error: Mutex<Option<ProviderError>>,
    put_error: Mutex<Option<ProviderError>>,
    storage_bucket: Mutex<Option<String>>,
    uploads: Mutex<Vec<(SourceBundle, Vec<u8>)>>,
    requested_since: Mutex<Vec<DateTime<Utc>>>,
    calls: Mutex<Calls>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(self, version: ApplicationVersion) -> Self {
        self.versions
            .lock()
            .insert(version.version_label.clone(), version);
        self
    }

    /// Statuses reported by successive lookups after the first one.
    pub fn with_processing(self, statuses: impl IntoIterator<Item = VersionStatus>) -> Self {
        self.processing.lock().extend(statuses);
        self
    }

    pub fn with_created_status(self, status: VersionStatus) -> Self {
        *self.created_status.lock() = Some(status);
        self
    }

    pub fn with_create_error(self, err: ProviderError) -> Self {
        *self.create_error.lock() = Some(err);
        self
    }

    /// Another run registers `version` just before our create call.
    pub fn with_concurrent_registration(self, version: ApplicationVersion) -> Self {
        *self.concurrent_version.lock() = Some(version);
        self
    }

    pub fn with_environments(self, script: impl IntoIterator<Item = EnvironmentStatus>) -> Self {
        self.environments.lock().extend(script.into_iter().map(Ok));
        self
    }

    pub fn with_environment_error(self, err: ProviderError) -> Self {
        self.environments.lock().push_back(Err(err));
        self
    }

    /// Event batches returned by successive polls.
    pub fn with_events(self, batches: impl IntoIterator<Item = Vec<EnvironmentEvent>>) -> Self {
        self.events.lock().extend(batches.into_iter().map(Ok));
        self
    }

    pub fn with_events_error(self, err: ProviderError) -> Self {
        self.events.lock().push_back(Err(err));
        self
    }

    pub fn with_health_error(self, err: ProviderError) -> Self {
        *self.health_error.lock() = Some(err);
        self
    }

    pub fn with_update_error(self, err: ProviderError) -> Self {
        *self.update_error.lock() = Some(err);
        self
    }

    pub fn with_put_error(self, err: ProviderError) -> Self {
        *self.put_error.lock() = Some(err);
        self
    }

    pub fn with_storage_bucket(self, bucket: &str) -> Self {
        *self.storage_bucket.lock() = Some(bucket.to_string());
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().clone()
    }

    pub fn uploads(&self) -> Vec<(SourceBundle, Vec<u8>)> {
        self.uploads.lock().clone()
    }

    pub fn event_windows(&self) -> Vec<DateTime<Utc>> {
        self.requested_since.lock().clone()
    }
}

#[async_trait]
impl VersionOps for MockProvider {
    async fn describe_application_version(
        &self,
        _application: &ApplicationName,
        label: &VersionLabel,
    ) -> Result<Option<ApplicationVersion>, ProviderError> {
        let lookup = {
            let mut calls = self.calls.lock();
            calls.describe_version += 1;
            calls.describe_version
        };

        let mut versions = self.versions.lock();
        let Some(version) = versions.get_mut(label.as_str()) else {
            return Ok(None);
        };
        if lookup > 1
            && let Some(next) = self.processing.lock().pop_front()
        {
            version.status = next;
        }
        Ok(Some(version.clone()))
    }

    async fn create_application_version(
        &self,
        new: &NewApplicationVersion<'_>,
    ) -> Result<ApplicationVersion, ProviderError> {
        self.calls.lock().create_version += 1;

        if let Some(existing) = self.concurrent_version.lock().take() {
            self.versions
                .lock()
                .insert(existing.version_label.clone(), existing);
            return Err(ProviderError::AlreadyExists(format!(
                "Application Version {} already exists.",
                new.version_label
            )));
        }
        if let Some(err) = self.create_error.lock().take() {
            return Err(err);
        }

        let created = ApplicationVersion {
            application_name: new.application_name.to_string(),
            version_label: new.version_label.to_string(),
            description: Some(new.description.to_string()),
            source_bundle: Some(new.source_bundle.clone()),
            status: self
                .created_status
                .lock()
                .clone()
                .unwrap_or(VersionStatus::Processed),
        };
        self.versions
            .lock()
            .insert(created.version_label.clone(), created.clone());
        Ok(created)
    }

    async fn storage_location(&self) -> Result<String, ProviderError> {
        self.calls.lock().storage_location += 1;
        self.storage_bucket
            .lock()
            .clone()
            .ok_or_else(|| ProviderError::Rejected {
                code: "InsufficientPrivilegesException".to_string(),
                message: "no storage location".to_string(),
            })
    }
}

#[async_trait]
impl EnvironmentOps for MockProvider {
    async fn describe_environment(
        &self,
        environment: EnvironmentRef<'_>,
    ) -> Result<EnvironmentStatus, ProviderError> {
        self.calls.lock().describe_environment += 1;

        let next = self.environments.lock().pop_front();
        match next {
            Some(Ok(status)) => {
                *self.last_environment.lock() = Some(status.clone());
                Ok(status)
            }
            Some(Err(err)) => Err(err),
            None => self.last_environment.lock().clone().ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "No Environment found for EnvironmentName = '{}'.",
                    environment.environment_name
                ))
            }),
        }
    }

    async fn describe_environment_health(
        &self,
        _environment: &EnvironmentName,
    ) -> Result<Option<HealthDetail>, ProviderError> {
        self.calls.lock().describe_health += 1;
        match self.health_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(Some(HealthDetail {
                health_status: Some("Ok".to_string()),
                color: Some("Green".to_string()),
                causes: Vec::new(),
            })),
        }
    }

    async fn describe_events(
        &self,
        _environment: EnvironmentRef<'_>,
        since: DateTime<Utc>,
    ) -> Result<Vec<EnvironmentEvent>, ProviderError> {
        self.calls.lock().describe_events += 1;
        self.requested_since.lock().push(since);
        self.events.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn update_environment(
        &self,
        _environment: EnvironmentRef<'_>,
        _label: &VersionLabel,
    ) -> Result<(), ProviderError> {
        self.calls.lock().update_environment += 1;
        match self.update_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BundleOps for MockProvider {
    async fn put_bundle(&self, location: &SourceBundle, body: Vec<u8>) -> Result<(), ProviderError> {
        self.calls.lock().put_bundle += 1;
        if let Some(err) = self.put_error.lock().take() {
            return Err(err);
        }
        self.uploads.lock().push((location.clone(), body));
        Ok(())
    }
}

// =============================================================================
// MockBuilder
// =============================================================================

/// Image builder double that records which containers it was asked to build.
#[derive(Default)]
pub struct MockBuilder {
    built: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl MockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(container: &str) -> Self {
        Self {
            built: Mutex::new(Vec::new()),
            fail_on: Some(container.to_string()),
        }
    }

    pub fn built(&self) -> Vec<String> {
        self.built.lock().clone()
    }
}

#[async_trait]
impl ImageBuilder for MockBuilder {
    async fn build_and_push(
        &self,
        container: &ContainerConfig,
        version: &VersionLabel,
        _base_path: &Path,
    ) -> Result<ImageRef, BuildError> {
        if self.fail_on.as_deref() == Some(container.name.as_str()) {
            return Err(BuildError::CommandFailed {
                command: format!("docker build -t {}", container.local_tag()),
                status: "exit status: 1".to_string(),
                stderr: "build failed".to_string(),
            });
        }
        self.built.lock().push(container.name.clone());
        Ok(container.image(version).unwrap())
    }
}
