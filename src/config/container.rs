// ABOUTME: Container declarations from the deployment config file.
// ABOUTME: Image base name, Dockerfile, port mappings, links, memory, and mounts.

use serde::Deserialize;
use std::path::PathBuf;

use super::deserialize::{deserialize_container_name, deserialize_image_repository};
use crate::types::{ImageRef, ImageRepository, ParseImageRefError, VersionLabel};

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerConfig {
    #[serde(deserialize_with = "deserialize_container_name")]
    pub name: String,

    pub dockerfile: PathBuf,

    #[serde(deserialize_with = "deserialize_image_repository")]
    pub image_base_name: ImageRepository,

    #[serde(default)]
    pub ports: Vec<PortMapping>,

    /// Soft memory limit in MiB.
    #[serde(default = "default_memory")]
    pub memory: u32,

    #[serde(default)]
    pub links: Vec<String>,

    #[serde(default)]
    pub mounts: Vec<ContainerMount>,
}

fn default_memory() -> u32 {
    1024
}

impl ContainerConfig {
    /// Image reference for this container at `version`.
    pub fn image(&self, version: &VersionLabel) -> Result<ImageRef, ParseImageRefError> {
        self.image_base_name.tagged(version)
    }

    /// Local tag used between build and push.
    pub fn local_tag(&self) -> String {
        format!("{}-ci", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerMount {
    pub host_path: String,
    pub container_path: String,
    #[serde(default)]
    pub read_only: bool,
}
