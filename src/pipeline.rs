// ABOUTME: Runs one deployment end to end: build, package, upload, register, update, watch.
// ABOUTME: Remote capabilities are passed in so the same flow runs against AWS or test doubles.

use crate::build::{ImageBuilder, build_all};
use crate::config::{
    BucketSource, BundleSource, DeploymentPlan, DeploymentRequest, ProcessingConfig, Settings,
};
use crate::deploy::{Deployment, DeploymentOutcome, storage_bucket};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::output::Output;
use crate::package::{Bundle, package};
use crate::provider::{BundleOps, EnvironmentOps, VersionOps};

/// Package the plan's bundle. Makes no remote calls.
pub fn package_plan(plan: &DeploymentPlan) -> Result<Bundle> {
    Ok(package(&plan.bundle, &plan.version_label)?)
}

/// Run the full deployment for `plan`.
pub async fn run<P, S, B>(
    plan: &DeploymentPlan,
    settings: &Settings,
    provider: &P,
    store: &S,
    builder: &B,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Result<DeploymentOutcome>
where
    P: VersionOps + EnvironmentOps + ?Sized,
    S: BundleOps + ?Sized,
    B: ImageBuilder + ?Sized,
{
    if plan.build_images
        && let BundleSource::Dockerrun { containers } = &plan.bundle
    {
        output.progress(&format!("Building {} image(s)...", containers.len()));
        build_all(builder, containers, &plan.version_label, &settings.base_path).await?;
    }

    output.progress("Packaging deployment archive...");
    let bundle = package_plan(plan)?;
    keep_artifact(&bundle, settings, diagnostics);

    let request = resolve_request(plan, provider).await?;
    tracing::info!(
        application = %request.application_name(),
        environment = %request.environment_name(),
        version = %request.version_label(),
        "deploying"
    );

    output.progress(&format!(
        "Uploading to s3://{}/{}...",
        request.version_bucket(),
        request.archive_key()
    ));
    let deployment = Deployment::new(request, bundle).upload_bundle(store).await?;

    output.progress(&format!(
        "Registering application version {}...",
        deployment.version_label()
    ));
    let deployment = deployment
        .register_version(provider, &ProcessingConfig::default(), diagnostics)
        .await?;

    output.progress(&format!(
        "Updating environment {}...",
        deployment.environment_name()
    ));
    let deployment = deployment.update_environment(provider).await?;
    if deployment.state().update_skipped() {
        output.progress("Environment already runs this version");
    }

    if !plan.wait_for_deployment {
        return Ok(deployment.finish_without_wait());
    }

    output.progress("Waiting for deployment to finish...");
    Ok(deployment.watch(provider, &plan.wait).await?)
}

/// Fill in the bucket, asking the provider for its storage location if none was named.
async fn resolve_request<P: VersionOps + ?Sized>(
    plan: &DeploymentPlan,
    provider: &P,
) -> Result<DeploymentRequest> {
    let builder = match &plan.bucket {
        BucketSource::Named(_) => plan.request.clone(),
        BucketSource::StorageLocation => {
            let bucket = storage_bucket(provider).await?;
            plan.request.clone().version_bucket(bucket)
        }
    };
    builder.build()
}

fn keep_artifact(bundle: &Bundle, settings: &Settings, diagnostics: &mut Diagnostics) {
    let dir = settings.artifacts_dir();
    match bundle.write_to(&dir) {
        Ok(path) => tracing::debug!(path = %path.display(), "archive copy written"),
        Err(err) => diagnostics.warn(Warning::artifact_write(format!(
            "could not write archive copy to {}: {err}",
            dir.display()
        ))),
    }
}
