// ABOUTME: Requests that an environment adopt a registered version.
// ABOUTME: Skips the request when the environment is already Ready on that label.

use chrono::{DateTime, Utc};
use snafu::ResultExt;

use super::error::{DeployError, EnvironmentDescribeSnafu, EnvironmentUpdateSnafu};
use crate::config::DeploymentRequest;
use crate::provider::{EnvironmentOps, Status};

/// What the updater did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReceipt {
    pub requested_at: DateTime<Utc>,
    pub skipped: bool,
}

pub async fn request_update<R: EnvironmentOps + ?Sized>(
    runtime: &R,
    request: &DeploymentRequest,
) -> Result<UpdateReceipt, DeployError> {
    let environment = request.environment();
    let environment_name = request.environment_name().as_str();
    let label = request.version_label();

    let current = runtime
        .describe_environment(environment)
        .await
        .context(EnvironmentDescribeSnafu {
            environment: environment_name,
        })?;

    if current.status == Status::Ready && current.runs(label) {
        tracing::info!(
            environment = environment_name,
            version = %label,
            "environment already runs this version, skipping update"
        );
        return Ok(UpdateReceipt {
            requested_at: Utc::now(),
            skipped: true,
        });
    }

    let requested_at = Utc::now();
    runtime
        .update_environment(environment, label)
        .await
        .context(EnvironmentUpdateSnafu {
            environment: environment_name,
        })?;

    tracing::info!(
        environment = environment_name,
        version = %label,
        previous = current.current_version_label.as_deref().unwrap_or("-"),
        "environment update requested"
    );
    Ok(UpdateReceipt {
        requested_at,
        skipped: false,
    })
}
