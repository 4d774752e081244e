// ABOUTME: Registers the application version for an uploaded bundle.
// ABOUTME: Reuses an existing label, creates at most once, then waits for processing.

use snafu::{IntoError, ResultExt};
use tokio::time::Instant;

use super::error::{
    DeployError, StorageLocationSnafu, VersionCreateSnafu, VersionLookupSnafu,
    VersionProcessingFailedSnafu, VersionProcessingTimeoutSnafu,
};
use crate::config::{DeploymentRequest, ProcessingConfig};
use crate::diagnostics::{Diagnostics, Warning};
use crate::provider::{
    ApplicationVersion, NewApplicationVersion, ProviderError, SourceBundle, VersionOps,
    VersionStatus,
};

/// Make sure an application version exists for the request's label and is deployable.
pub async fn register<R: VersionOps + ?Sized>(
    runtime: &R,
    request: &DeploymentRequest,
    source_bundle: &SourceBundle,
    processing: &ProcessingConfig,
    diagnostics: &mut Diagnostics,
) -> Result<ApplicationVersion, DeployError> {
    let label = request.version_label();

    let version = match lookup(runtime, request).await? {
        Some(existing) => {
            tracing::info!(version = %label, "application version already registered, reusing");
            check_bundle(&existing, source_bundle, diagnostics);
            existing
        }
        None => {
            let new_version = NewApplicationVersion {
                application_name: request.application_name(),
                version_label: label,
                description: request.version_description(),
                source_bundle: source_bundle.clone(),
            };
            match runtime.create_application_version(&new_version).await {
                Ok(created) => {
                    tracing::info!(version = %label, bundle = %source_bundle, "application version created");
                    created
                }
                Err(ProviderError::AlreadyExists(_)) => {
                    tracing::info!(version = %label, "application version registered concurrently, reusing");
                    let existing = require(runtime, request).await?;
                    check_bundle(&existing, source_bundle, diagnostics);
                    existing
                }
                Err(source) => {
                    return Err(VersionCreateSnafu {
                        label: label.as_str(),
                    }
                    .into_error(source));
                }
            }
        }
    };

    wait_until_processed(runtime, request, version, processing).await
}

async fn lookup<R: VersionOps + ?Sized>(
    runtime: &R,
    request: &DeploymentRequest,
) -> Result<Option<ApplicationVersion>, DeployError> {
    runtime
        .describe_application_version(request.application_name(), request.version_label())
        .await
        .context(VersionLookupSnafu {
            label: request.version_label().as_str(),
        })
}

/// Look the version up and treat absence as an error.
async fn require<R: VersionOps + ?Sized>(
    runtime: &R,
    request: &DeploymentRequest,
) -> Result<ApplicationVersion, DeployError> {
    let label = request.version_label().as_str();
    lookup(runtime, request).await?.ok_or_else(|| {
        VersionLookupSnafu { label }.into_error(ProviderError::NotFound(label.to_string()))
    })
}

/// A reused label may point at another archive. Keep going, but say so.
fn check_bundle(
    version: &ApplicationVersion,
    uploaded: &SourceBundle,
    diagnostics: &mut Diagnostics,
) {
    if let Some(existing) = &version.source_bundle
        && existing != uploaded
    {
        diagnostics.warn(Warning::bundle_mismatch(format!(
            "application version {} already exists with bundle {existing}; the archive uploaded to {uploaded} is not used",
            version.version_label
        )));
    }
}

async fn wait_until_processed<R: VersionOps + ?Sized>(
    runtime: &R,
    request: &DeploymentRequest,
    mut version: ApplicationVersion,
    processing: &ProcessingConfig,
) -> Result<ApplicationVersion, DeployError> {
    let label = request.version_label().as_str();
    let started = Instant::now();

    loop {
        if version.status.is_usable() {
            return Ok(version);
        }
        if version.status == VersionStatus::Failed {
            return VersionProcessingFailedSnafu { label }.fail();
        }

        let waited = started.elapsed();
        if waited >= processing.timeout {
            return VersionProcessingTimeoutSnafu { label, waited }.fail();
        }

        tracing::debug!(version = label, status = ?version.status, "waiting for version processing");
        tokio::time::sleep(processing.interval).await;

        match runtime
            .describe_application_version(request.application_name(), request.version_label())
            .await
        {
            Ok(Some(latest)) => version = latest,
            Ok(None) => {
                return Err(VersionLookupSnafu { label }
                    .into_error(ProviderError::NotFound(label.to_string())));
            }
            Err(err) if err.is_transient() => {
                tracing::warn!(version = label, error = %err, "version lookup failed, retrying");
            }
            Err(source) => return Err(VersionLookupSnafu { label }.into_error(source)),
        }
    }
}

/// The provider's own version bucket, created on first use.
pub async fn storage_bucket<R: VersionOps + ?Sized>(runtime: &R) -> Result<String, DeployError> {
    let bucket = runtime.storage_location().await.context(StorageLocationSnafu)?;
    tracing::debug!(bucket = %bucket, "using provider storage location");
    Ok(bucket)
}
