// ABOUTME: Deploy stage error types with SNAFU context selectors.
// ABOUTME: Each variant names the stage and the resource the failing call addressed.

use snafu::Snafu;
use std::time::Duration;

use crate::provider::ProviderError;

/// Fatal errors raised by the upload, register, update, and watch stages.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DeployError {
    #[snafu(display("failed to resolve the provider storage bucket: {source}"))]
    StorageLocation { source: ProviderError },

    #[snafu(display("failed to upload bundle to s3://{bucket}/{key}: {source}"))]
    Upload {
        bucket: String,
        key: String,
        source: ProviderError,
    },

    #[snafu(display("failed to look up application version {label}: {source}"))]
    VersionLookup { label: String, source: ProviderError },

    #[snafu(display("failed to create application version {label}: {source}"))]
    VersionCreate { label: String, source: ProviderError },

    #[snafu(display("application version {label} failed processing"))]
    VersionProcessingFailed { label: String },

    #[snafu(display(
        "application version {label} still processing after {}s",
        waited.as_secs()
    ))]
    VersionProcessingTimeout { label: String, waited: Duration },

    #[snafu(display("failed to describe environment {environment}: {source}"))]
    EnvironmentDescribe {
        environment: String,
        source: ProviderError,
    },

    #[snafu(display("failed to update environment {environment}: {source}"))]
    EnvironmentUpdate {
        environment: String,
        source: ProviderError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// The archive could not be stored.
    Upload,
    /// The application version could not be registered or processed.
    Registration,
    /// The environment rejected the update request.
    Update,
    /// The environment could not be observed.
    Observation,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::StorageLocation { .. } | DeployError::Upload { .. } => {
                DeployErrorKind::Upload
            }
            DeployError::VersionLookup { .. }
            | DeployError::VersionCreate { .. }
            | DeployError::VersionProcessingFailed { .. }
            | DeployError::VersionProcessingTimeout { .. } => DeployErrorKind::Registration,
            DeployError::EnvironmentUpdate { .. } => DeployErrorKind::Update,
            DeployError::EnvironmentDescribe { .. } => DeployErrorKind::Observation,
        }
    }

    /// The provider error behind this failure, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            DeployError::StorageLocation { source }
            | DeployError::Upload { source, .. }
            | DeployError::VersionLookup { source, .. }
            | DeployError::VersionCreate { source, .. }
            | DeployError::EnvironmentDescribe { source, .. }
            | DeployError::EnvironmentUpdate { source, .. } => Some(source),
            DeployError::VersionProcessingFailed { .. }
            | DeployError::VersionProcessingTimeout { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snafu::ResultExt;

    #[test]
    fn context_selector_keeps_source() {
        let result: Result<(), ProviderError> = Err(ProviderError::NotFound("demo-dev".into()));
        let err = result
            .context(EnvironmentUpdateSnafu {
                environment: "demo-dev",
            })
            .unwrap_err();

        assert_eq!(err.kind(), DeployErrorKind::Update);
        assert!(matches!(
            err.provider_error(),
            Some(ProviderError::NotFound(_))
        ));
        assert!(err.to_string().contains("demo-dev"));
    }

    #[test]
    fn processing_timeout_reports_seconds() {
        let err = VersionProcessingTimeoutSnafu {
            label: "abc123",
            waited: Duration::from_secs(300),
        }
        .build();
        assert_eq!(err.kind(), DeployErrorKind::Registration);
        assert!(err.to_string().contains("300s"));
    }
}
