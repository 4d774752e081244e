// ABOUTME: Container image repository parsing and tagging.
// ABOUTME: Turns a configured image base name into a tagged reference per version.

use std::fmt;
use thiserror::Error;

use super::VersionLabel;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("image base name must not carry a tag or digest: {0}")]
    TagNotAllowed(String),

    #[error("invalid image tag: {0}")]
    InvalidTag(String),
}

/// An image repository without tag, e.g. `123.dkr.ecr.eu-central-1.amazonaws.com/app`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRepository {
    registry: Option<String>,
    name: String,
}

impl ImageRepository {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        for c in input.chars() {
            if !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@') {
                return Err(ParseImageRefError::InvalidChar(c));
            }
        }

        if input.contains('@') {
            return Err(ParseImageRefError::TagNotAllowed(input.to_string()));
        }

        // A colon after the last slash is a tag; before it, a registry port.
        let last_segment = input.rsplit('/').next().unwrap_or(input);
        if last_segment.contains(':') {
            return Err(ParseImageRefError::TagNotAllowed(input.to_string()));
        }

        let (registry, name) = match input.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (Some(first.to_string()), rest.to_string())
            }
            _ => (None, input.to_string()),
        };

        Ok(Self { registry, name })
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the registry is an Amazon ECR registry.
    pub fn is_ecr(&self) -> bool {
        self.ecr_region().is_some()
    }

    /// Region encoded in an ECR host like `<account>.dkr.ecr.<region>.amazonaws.com`.
    pub fn ecr_region(&self) -> Option<&str> {
        let host = self.registry.as_deref()?;
        let rest = host.split_once(".dkr.ecr.")?.1;
        let region = rest.split_once(".amazonaws.com")?.0;
        (!region.is_empty()).then_some(region)
    }

    /// Reference this repository at the given version.
    pub fn tagged(&self, version: &VersionLabel) -> Result<ImageRef, ParseImageRefError> {
        let tag = version.as_str();
        let valid = tag.len() <= 128
            && !tag.starts_with(['.', '-'])
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        if !valid {
            return Err(ParseImageRefError::InvalidTag(tag.to_string()));
        }

        Ok(ImageRef {
            repository: self.clone(),
            tag: tag.to_string(),
        })
    }
}

impl fmt::Display for ImageRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}", self.name)
    }
}

/// A fully tagged image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    repository: ImageRepository,
    tag: String,
}

impl ImageRef {
    pub fn repository(&self) -> &ImageRepository {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
