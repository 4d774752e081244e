// ABOUTME: Multi-container Dockerrun.aws.json (version 2) descriptor.
// ABOUTME: Maps configured containers to image references, ports, links, and volumes.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::PackageError;
use crate::config::ContainerConfig;
use crate::types::VersionLabel;

pub const DOCKERRUN_FILENAME: &str = "Dockerrun.aws.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dockerrun {
    #[serde(rename = "AWSEBDockerrunVersion")]
    pub version: u8,
    pub volumes: Vec<Volume>,
    #[serde(rename = "containerDefinitions")]
    pub container_definitions: Vec<ContainerDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Volume {
    pub name: String,
    pub host: VolumeHost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeHost {
    pub source_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    pub environment: Vec<EnvironmentEntry>,
    pub essential: bool,
    pub links: Vec<String>,
    pub memory_reservation: u32,
    pub port_mappings: Vec<PortMappingEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mount_points: Vec<MountPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMappingEntry {
    pub host_port: u16,
    pub container_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountPoint {
    pub source_volume: String,
    pub container_path: String,
    pub read_only: bool,
}

impl Dockerrun {
    /// Build the descriptor for `containers`, all tagged with `version`.
    pub fn for_containers<'a>(
        containers: impl IntoIterator<Item = &'a ContainerConfig>,
        version: &VersionLabel,
    ) -> Result<Self, PackageError> {
        let mut volumes: Vec<Volume> = Vec::new();
        let mut definitions = Vec::new();

        for container in containers {
            let image = container
                .image(version)
                .map_err(|source| PackageError::Image {
                    container: container.name.clone(),
                    source,
                })?;

            let mut mount_points = Vec::with_capacity(container.mounts.len());
            for mount in &container.mounts {
                let name = volume_name(&mount.host_path);
                if !volumes.iter().any(|v| v.name == name) {
                    volumes.push(Volume {
                        name: name.clone(),
                        host: VolumeHost {
                            source_path: mount.host_path.clone(),
                        },
                    });
                }
                mount_points.push(MountPoint {
                    source_volume: name,
                    container_path: mount.container_path.clone(),
                    read_only: mount.read_only,
                });
            }

            definitions.push(ContainerDefinition {
                name: container.name.clone(),
                image: image.to_string(),
                environment: Vec::new(),
                essential: true,
                links: container.links.clone(),
                memory_reservation: container.memory,
                port_mappings: container
                    .ports
                    .iter()
                    .map(|p| PortMappingEntry {
                        host_port: p.host,
                        container_port: p.container,
                    })
                    .collect(),
                mount_points,
            });
        }

        Ok(Dockerrun {
            version: 2,
            volumes,
            container_definitions: definitions,
        })
    }

    pub fn to_json(&self) -> Result<String, PackageError> {
        serde_json::to_string_pretty(self).map_err(PackageError::from)
    }
}

/// Volumes are named after the host path so every mount of it shares one volume.
pub fn volume_name(host_path: &str) -> String {
    hex::encode(Sha256::digest(host_path.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_name_is_stable_hex() {
        let name = volume_name("/var/data");
        assert_eq!(name.len(), 64);
        assert_eq!(name, volume_name("/var/data"));
        assert_ne!(name, volume_name("/var/other"));
    }
}
