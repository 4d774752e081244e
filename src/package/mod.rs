// ABOUTME: Builds the deployment archive from either bundle source.
// ABOUTME: Dockerrun bundles hold a generated descriptor; compose bundles hold the compose file and hooks.

mod archive;
mod dockerrun;

pub use archive::ArchiveWriter;
pub use dockerrun::{
    ContainerDefinition, DOCKERRUN_FILENAME, Dockerrun, MountPoint, PortMappingEntry, Volume,
    VolumeHost, volume_name,
};

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::BundleSource;
use crate::types::{ParseImageRefError, VersionLabel};

pub const COMPOSE_FILENAME: &str = "docker-compose.yml";
pub const PLATFORM_DIR: &str = ".platform";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("container {container}: {source}")]
    Image {
        container: String,
        source: ParseImageRefError,
    },

    #[error("invalid compose file {path}: {reason}")]
    InvalidCompose { path: PathBuf, reason: String },

    #[error("path escapes the hooks directory: {0}")]
    OutsideTree(PathBuf),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("descriptor serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished deployment archive, held in memory until uploaded.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Bundle {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Keep a copy of the archive on disk for CI artifact upload.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, PackageError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Package `source` into a ZIP archive named after `version`.
pub fn package(source: &BundleSource, version: &VersionLabel) -> Result<Bundle, PackageError> {
    let mut archive = ArchiveWriter::new();

    match source {
        BundleSource::Dockerrun { containers } => {
            let descriptor = Dockerrun::for_containers(containers.iter(), version)?;
            archive.add_file(DOCKERRUN_FILENAME, descriptor.to_json()?.as_bytes(), false)?;
        }
        BundleSource::Compose {
            compose_file,
            platform_hooks,
        } => {
            let contents = std::fs::read(compose_file)?;
            check_compose(compose_file, &contents)?;
            archive.add_file(COMPOSE_FILENAME, &contents, false)?;

            if let Some(hooks) = platform_hooks {
                archive.add_executable_tree(PLATFORM_DIR, hooks)?;
            }
        }
    }

    let entries = archive.len();
    let bundle = Bundle {
        file_name: version.archive_name(),
        bytes: archive.finish()?,
    };
    tracing::info!(
        file = %bundle.file_name,
        entries,
        bytes = bundle.len(),
        "packaged deployment archive"
    );
    Ok(bundle)
}

/// The compose file must at least declare a `services` mapping.
fn check_compose(path: &Path, contents: &[u8]) -> Result<(), PackageError> {
    let invalid = |reason: String| PackageError::InvalidCompose {
        path: path.to_path_buf(),
        reason,
    };

    let document: serde_yaml::Value =
        serde_yaml::from_slice(contents).map_err(|e| invalid(e.to_string()))?;
    match document.get("services") {
        Some(serde_yaml::Value::Mapping(services)) if !services.is_empty() => Ok(()),
        Some(_) => Err(invalid("`services` must be a non-empty mapping".to_string())),
        None => Err(invalid("missing `services`".to_string())),
    }
}
