// ABOUTME: The immutable DeploymentRequest and the builder that validates it.
// ABOUTME: Both config shapes funnel through this builder before any remote call.

use crate::error::{Error, Result};
use crate::provider::{EnvironmentRef, SourceBundle};
use crate::types::{ApplicationName, EnvironmentName, VersionLabel};

/// Longest description the provider accepts for an application version.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Everything the core stages need to deploy one version to one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    application_name: ApplicationName,
    environment_name: EnvironmentName,
    version_label: VersionLabel,
    version_description: String,
    version_bucket: String,
    archive_key: String,
}

impl DeploymentRequest {
    pub fn builder() -> DeploymentRequestBuilder {
        DeploymentRequestBuilder::default()
    }

    pub fn application_name(&self) -> &ApplicationName {
        &self.application_name
    }

    pub fn environment_name(&self) -> &EnvironmentName {
        &self.environment_name
    }

    pub fn version_label(&self) -> &VersionLabel {
        &self.version_label
    }

    pub fn version_description(&self) -> &str {
        &self.version_description
    }

    pub fn version_bucket(&self) -> &str {
        &self.version_bucket
    }

    pub fn archive_key(&self) -> &str {
        &self.archive_key
    }

    /// Where the archive for this request is stored.
    pub fn source_bundle(&self) -> SourceBundle {
        SourceBundle {
            bucket: self.version_bucket.clone(),
            key: self.archive_key.clone(),
        }
    }

    pub fn environment(&self) -> EnvironmentRef<'_> {
        EnvironmentRef {
            application_name: &self.application_name,
            environment_name: &self.environment_name,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentRequestBuilder {
    application_name: Option<String>,
    environment_name: Option<String>,
    version_label: Option<VersionLabel>,
    version_description: Option<String>,
    version_bucket: Option<String>,
}

impl DeploymentRequestBuilder {
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn environment_name(mut self, name: impl Into<String>) -> Self {
        self.environment_name = Some(name.into());
        self
    }

    pub fn version_label(mut self, label: VersionLabel) -> Self {
        self.version_label = Some(label);
        self
    }

    pub fn version_description(mut self, description: impl Into<String>) -> Self {
        self.version_description = Some(description.into());
        self
    }

    pub fn version_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.version_bucket = Some(bucket.into());
        self
    }

    /// Check every field except the bucket, which may be resolved remotely later.
    pub fn validate(&self) -> Result<()> {
        self.typed_names().map(|_| ())
    }

    pub fn build(self) -> Result<DeploymentRequest> {
        let (application_name, environment_name, version_label) = self.typed_names()?;

        let version_bucket = self
            .version_bucket
            .ok_or(Error::MissingInput("application_version_bucket"))?;
        validate_bucket(&version_bucket)?;

        let description = self
            .version_description
            .unwrap_or_else(|| format!("Deployment of {version_label}"));

        Ok(DeploymentRequest {
            archive_key: version_label.archive_name(),
            application_name,
            environment_name,
            version_description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
            version_label,
            version_bucket,
        })
    }

    fn typed_names(&self) -> Result<(ApplicationName, EnvironmentName, VersionLabel)> {
        let application_name = self
            .application_name
            .as_deref()
            .ok_or(Error::MissingInput("application_name"))?;
        let environment_name = self
            .environment_name
            .as_deref()
            .ok_or(Error::MissingInput("environment_name"))?;
        let version_label = self
            .version_label
            .clone()
            .ok_or(Error::MissingInput("version_label"))?;

        Ok((
            ApplicationName::new(application_name).map_err(invalid)?,
            EnvironmentName::new(environment_name).map_err(invalid)?,
            version_label,
        ))
    }
}

fn invalid(err: impl std::fmt::Display) -> Error {
    Error::InvalidConfig(err.to_string())
}

fn validate_bucket(bucket: &str) -> Result<()> {
    let len = bucket.len();
    let valid_chars = bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-'));
    if !(3..=63).contains(&len) || !valid_chars {
        return Err(Error::InvalidConfig(format!(
            "invalid application version bucket name: {bucket:?}"
        )));
    }
    Ok(())
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> VersionLabel {
        VersionLabel::new("abc123").unwrap()
    }

    #[test]
    fn description_is_truncated() {
        let request = DeploymentRequest::builder()
            .application_name("demo")
            .environment_name("demo-dev")
            .version_label(label())
            .version_description("x".repeat(300))
            .version_bucket("versions-bucket")
            .build()
            .unwrap();
        assert_eq!(request.version_description().len(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn validate_ignores_missing_bucket() {
        let builder = DeploymentRequest::builder()
            .application_name("demo")
            .environment_name("demo-dev")
            .version_label(label());
        assert!(builder.validate().is_ok());
        assert!(matches!(
            builder.build(),
            Err(Error::MissingInput("application_version_bucket"))
        ));
    }

    #[test]
    fn rejects_bucket_with_uppercase() {
        let result = DeploymentRequest::builder()
            .application_name("demo")
            .environment_name("demo-dev")
            .version_label(label())
            .version_bucket("My-Bucket")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
