// ABOUTME: Resolves either config shape into one DeploymentPlan.
// ABOUTME: The file shape carries containers; the compose shape carries a compose file and hooks.

use nonempty::NonEmpty;
use std::path::PathBuf;

use super::request::DeploymentRequestBuilder;
use super::settings::{ConfigSource, Settings};
use super::wait::WaitConfig;
use super::{ContainerConfig, FileConfig};
use crate::error::{Error, Result};
use crate::types::VersionLabel;

/// Where application versions are uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketSource {
    Named(String),
    /// Ask the provider for its own storage bucket.
    StorageLocation,
}

/// What goes into the deployment archive.
#[derive(Debug, Clone)]
pub enum BundleSource {
    Dockerrun {
        containers: NonEmpty<ContainerConfig>,
    },
    Compose {
        compose_file: PathBuf,
        platform_hooks: Option<PathBuf>,
    },
}

/// A validated description of one deployment run.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub version_label: VersionLabel,
    pub request: DeploymentRequestBuilder,
    pub bucket: BucketSource,
    pub bundle: BundleSource,
    pub build_images: bool,
    pub wait_for_deployment: bool,
    pub wait: WaitConfig,
}

impl DeploymentPlan {
    /// Load and validate the plan. Makes no remote calls.
    pub fn load(settings: &Settings) -> Result<Self> {
        let plan = match &settings.source {
            ConfigSource::File(path) => Self::from_file(settings, FileConfig::load(path)?),
            ConfigSource::Compose {
                compose_file,
                platform_hooks,
            } => Self::from_compose(settings, compose_file.clone(), platform_hooks.clone())?,
        };

        match plan.bucket {
            BucketSource::Named(_) => plan.request.clone().build().map(|_| ())?,
            BucketSource::StorageLocation => plan.request.validate()?,
        }
        if plan.wait.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "wait interval must be greater than zero".to_string(),
            ));
        }

        tracing::debug!(
            build_images = plan.build_images,
            wait = plan.wait_for_deployment,
            "deployment plan loaded"
        );
        Ok(plan)
    }

    /// The file shape: names and bucket come from the file, inputs may override them.
    pub fn from_file(settings: &Settings, file: FileConfig) -> Self {
        let application = settings
            .application_name
            .clone()
            .unwrap_or_else(|| file.application_name.to_string());
        let environment = settings
            .environment_name
            .clone()
            .unwrap_or_else(|| file.environment_name.to_string());
        let bucket = settings
            .version_bucket
            .clone()
            .unwrap_or(file.application_version_bucket);

        DeploymentPlan {
            version_label: settings.version_label.clone(),
            request: base_request(settings)
                .application_name(application)
                .environment_name(environment)
                .version_bucket(bucket.clone()),
            bucket: BucketSource::Named(bucket),
            bundle: BundleSource::Dockerrun {
                containers: file.containers,
            },
            build_images: file.build_and_upload_image,
            wait_for_deployment: settings.wait_for_deployment,
            wait: wait_config(settings, file.wait),
        }
    }

    /// The compose shape: names must come from inputs; images are prebuilt.
    pub fn from_compose(
        settings: &Settings,
        compose_file: PathBuf,
        platform_hooks: Option<PathBuf>,
    ) -> Result<Self> {
        let application = settings
            .application_name
            .clone()
            .ok_or(Error::MissingInput("application_name"))?;
        let environment = settings
            .environment_name
            .clone()
            .ok_or(Error::MissingInput("environment_name"))?;

        if !compose_file.is_file() {
            return Err(Error::ConfigNotFound(compose_file));
        }
        if let Some(hooks) = &platform_hooks
            && !hooks.is_dir()
        {
            return Err(Error::ConfigNotFound(hooks.clone()));
        }

        let mut request = base_request(settings)
            .application_name(application)
            .environment_name(environment);
        let bucket = match &settings.version_bucket {
            Some(bucket) => {
                request = request.version_bucket(bucket.clone());
                BucketSource::Named(bucket.clone())
            }
            None => BucketSource::StorageLocation,
        };

        Ok(DeploymentPlan {
            version_label: settings.version_label.clone(),
            request,
            bucket,
            bundle: BundleSource::Compose {
                compose_file,
                platform_hooks,
            },
            build_images: false,
            wait_for_deployment: settings.wait_for_deployment,
            wait: wait_config(settings, None),
        })
    }
}

fn base_request(settings: &Settings) -> DeploymentRequestBuilder {
    DeploymentRequestBuilder::default()
        .version_label(settings.version_label.clone())
        .version_description(settings.version_description.clone())
}

/// Inputs win over the file, the file wins over defaults.
fn wait_config(settings: &Settings, file: Option<WaitConfig>) -> WaitConfig {
    let base = file.unwrap_or_default();
    WaitConfig {
        timeout: settings.wait_timeout.unwrap_or(base.timeout),
        interval: settings.poll_interval.unwrap_or(base.interval),
    }
}
