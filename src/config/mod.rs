// ABOUTME: Configuration types and loading for beanstalk-deploy.
// ABOUTME: Parses the JSON config file and resolves both config shapes into a plan.

mod container;
mod deserialize;
mod plan;
mod request;
mod settings;
mod wait;

pub use container::{ContainerConfig, ContainerMount, PortMapping};
pub use plan::{BucketSource, BundleSource, DeploymentPlan};
pub use request::{DeploymentRequest, DeploymentRequestBuilder, MAX_DESCRIPTION_CHARS};
pub use settings::{
    ConfigSource, DEFAULT_REGION, Inputs, Settings, parse_flag, resolve_region, resolve_target,
};
pub use wait::{ProcessingConfig, WaitConfig};

use crate::error::{Error, Result};
use crate::types::{ApplicationName, EnvironmentName};
use deserialize::{
    deserialize_application_name, deserialize_containers, deserialize_environment_name,
};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::Path;

/// The JSON deployment config file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(deserialize_with = "deserialize_application_name")]
    pub application_name: ApplicationName,

    #[serde(deserialize_with = "deserialize_environment_name")]
    pub environment_name: EnvironmentName,

    pub application_version_bucket: String,

    pub build_and_upload_image: bool,

    #[serde(deserialize_with = "deserialize_containers")]
    pub containers: NonEmpty<ContainerConfig>,

    #[serde(default)]
    pub wait: Option<WaitConfig>,
}

impl FileConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
