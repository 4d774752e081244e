// ABOUTME: Application-wide error types for beanstalk-deploy.
// ABOUTME: Uses thiserror; each variant maps to a process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::build::BuildError;
use crate::deploy::DeployError;
use crate::package::PackageError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("image build failed: {0}")]
    Build(#[from] BuildError),

    #[error("packaging failed: {0}")]
    Package(#[from] PackageError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors raised before any remote call was made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound(_)
                | Error::MissingInput(_)
                | Error::InvalidConfig(_)
                | Error::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
