// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use snafu::ResultExt;

use crate::config::{ProcessingConfig, WaitConfig};
use crate::diagnostics::Diagnostics;
use crate::provider::{BundleOps, EnvironmentOps, VersionOps};

use super::Deployment;
use super::error::{DeployError, UploadSnafu};
use super::outcome::DeploymentOutcome;
use super::state::{Packaged, Registered, Updated, Uploaded};
use super::{registrar, updater, watcher};

// =============================================================================
// Packaged -> Uploaded
// =============================================================================

impl Deployment<Packaged> {
    /// Store the archive at the request's bucket and key.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Upload` if the store rejects the object.
    pub async fn upload_bundle<B: BundleOps + ?Sized>(
        self,
        store: &B,
    ) -> Result<Deployment<Uploaded>, DeployError> {
        let location = self.request.source_bundle();
        let size = self.state.bundle.len();

        store
            .put_bundle(&location, self.state.bundle.bytes)
            .await
            .context(UploadSnafu {
                bucket: &location.bucket,
                key: &location.key,
            })?;
        tracing::info!(bundle = %location, bytes = size, "deployment archive uploaded");

        Ok(Deployment {
            request: self.request,
            state: Uploaded {
                source_bundle: location,
            },
        })
    }
}

// =============================================================================
// Uploaded -> Registered
// =============================================================================

impl Deployment<Uploaded> {
    /// Register (or reuse) the application version and wait until it is usable.
    ///
    /// # Errors
    ///
    /// Returns a registration error if the lookup or create call fails, or
    /// if processing fails or outlasts `processing.timeout`.
    pub async fn register_version<R: VersionOps + ?Sized>(
        self,
        runtime: &R,
        processing: &ProcessingConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Deployment<Registered>, DeployError> {
        let version = registrar::register(
            runtime,
            &self.request,
            &self.state.source_bundle,
            processing,
            diagnostics,
        )
        .await?;

        Ok(Deployment {
            request: self.request,
            state: Registered { version },
        })
    }
}

// =============================================================================
// Registered -> Updated
// =============================================================================

impl Deployment<Registered> {
    /// Ask the environment to deploy the registered version.
    pub async fn update_environment<R: EnvironmentOps + ?Sized>(
        self,
        runtime: &R,
    ) -> Result<Deployment<Updated>, DeployError> {
        let receipt = updater::request_update(runtime, &self.request).await?;

        Ok(Deployment {
            request: self.request,
            state: Updated {
                version: self.state.version,
                requested_at: receipt.requested_at,
                update_skipped: receipt.skipped,
            },
        })
    }
}

// =============================================================================
// Updated -> outcome
// =============================================================================

impl Deployment<Updated> {
    /// Poll the environment until it settles or the wait runs out.
    pub async fn watch<R: EnvironmentOps + ?Sized>(
        self,
        runtime: &R,
        wait: &WaitConfig,
    ) -> Result<DeploymentOutcome, DeployError> {
        watcher::watch(runtime, &self.request, self.state.requested_at, wait).await
    }

    /// Finish without observing the environment.
    pub fn finish_without_wait(self) -> DeploymentOutcome {
        tracing::info!(
            environment = %self.request.environment_name(),
            "not waiting for deployment to finish"
        );
        DeploymentOutcome::not_watched()
    }
}
