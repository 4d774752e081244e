// ABOUTME: Composable capability traits for the deployment provider.
// ABOUTME: VersionOps, EnvironmentOps, and BundleOps split the remote calls by stage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::ProviderError;
use super::types::{
    ApplicationVersion, EnvironmentEvent, EnvironmentRef, EnvironmentStatus, HealthDetail,
    NewApplicationVersion, SourceBundle,
};
use crate::types::{ApplicationName, EnvironmentName, VersionLabel};

/// Application version operations.
#[async_trait]
pub trait VersionOps: Send + Sync {
    /// Look up a version by label. `Ok(None)` when it does not exist.
    async fn describe_application_version(
        &self,
        application: &ApplicationName,
        label: &VersionLabel,
    ) -> Result<Option<ApplicationVersion>, ProviderError>;

    /// Register a new application version and start processing it.
    async fn create_application_version(
        &self,
        version: &NewApplicationVersion<'_>,
    ) -> Result<ApplicationVersion, ProviderError>;

    /// Bucket the provider keeps for application versions, created on demand.
    async fn storage_location(&self) -> Result<String, ProviderError>;
}

/// Environment observation and update operations.
#[async_trait]
pub trait EnvironmentOps: Send + Sync {
    /// Current status snapshot of an environment.
    async fn describe_environment(
        &self,
        environment: EnvironmentRef<'_>,
    ) -> Result<EnvironmentStatus, ProviderError>;

    /// Enhanced health detail, `Ok(None)` when the environment has none.
    async fn describe_environment_health(
        &self,
        environment: &EnvironmentName,
    ) -> Result<Option<HealthDetail>, ProviderError>;

    /// Events emitted after `since`, newest first.
    async fn describe_events(
        &self,
        environment: EnvironmentRef<'_>,
        since: DateTime<Utc>,
    ) -> Result<Vec<EnvironmentEvent>, ProviderError>;

    /// Ask the environment to deploy `label`. Returns once the request is accepted.
    async fn update_environment(
        &self,
        environment: EnvironmentRef<'_>,
        label: &VersionLabel,
    ) -> Result<(), ProviderError>;
}

/// Source bundle storage.
#[async_trait]
pub trait BundleOps: Send + Sync {
    /// Store `body` at the given location, replacing any previous object.
    async fn put_bundle(&self, location: &SourceBundle, body: Vec<u8>)
    -> Result<(), ProviderError>;
}
