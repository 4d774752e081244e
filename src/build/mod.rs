// ABOUTME: Container image building and pushing.
// ABOUTME: ImageBuilder is the seam; DockerCli drives the local docker and aws binaries.

mod docker;

pub use docker::DockerCli;

use async_trait::async_trait;
use nonempty::NonEmpty;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ContainerConfig;
use crate::types::{ImageRef, ParseImageRefError, VersionLabel};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Dockerfile not found for container {container}: {path}")]
    MissingDockerfile { container: String, path: PathBuf },

    #[error("container {container}: {source}")]
    Image {
        container: String,
        source: ParseImageRefError,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// A streamed command failed; its output is already in the log.
    #[error("`{command}` exited with {status}")]
    Exited { command: String, status: String },
}

/// Builds a container image and pushes it under its version tag.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build_and_push(
        &self,
        container: &ContainerConfig,
        version: &VersionLabel,
        base_path: &Path,
    ) -> Result<ImageRef, BuildError>;
}

/// Build and push every container in declaration order, stopping at the first failure.
pub async fn build_all<B: ImageBuilder + ?Sized>(
    builder: &B,
    containers: &NonEmpty<ContainerConfig>,
    version: &VersionLabel,
    base_path: &Path,
) -> Result<Vec<ImageRef>, BuildError> {
    let mut pushed = Vec::with_capacity(containers.len());
    for container in containers.iter() {
        let image = builder.build_and_push(container, version, base_path).await?;
        tracing::info!(container = %container.name, image = %image, "image pushed");
        pushed.push(image);
    }
    Ok(pushed)
}
