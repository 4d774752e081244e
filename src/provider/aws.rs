// ABOUTME: AWS SDK implementation of the provider traits.
// ABOUTME: Talks to Elastic Beanstalk for versions and environments, S3 for bundles.

use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_elasticbeanstalk::primitives::DateTime as SmithyDateTime;
use aws_sdk_elasticbeanstalk::types::{
    ApplicationVersionDescription, EnvironmentHealthAttribute, S3Location,
};
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};

use super::error::ProviderError;
use super::traits::{BundleOps, EnvironmentOps, VersionOps};
use super::types::{
    ApplicationVersion, EnvironmentEvent, EnvironmentRef, EnvironmentStatus, EventSeverity, Health,
    HealthDetail, NewApplicationVersion, SourceBundle, Status, VersionStatus,
};
use crate::types::{ApplicationName, EnvironmentName, VersionLabel};

/// Provider backed by the AWS SDK, bound to one region.
#[derive(Debug, Clone)]
pub struct AwsProvider {
    beanstalk: aws_sdk_elasticbeanstalk::Client,
    s3: aws_sdk_s3::Client,
}

impl AwsProvider {
    /// Load credentials from the default chain and build clients for `region`.
    pub async fn connect(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        tracing::debug!(region, "AWS clients configured");

        Self {
            beanstalk: aws_sdk_elasticbeanstalk::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
        }
    }
}

fn provider_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => ProviderError::from_service(service.code(), service.message()),
        None => ProviderError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

fn to_chrono(value: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

fn to_version(
    description: &ApplicationVersionDescription,
    fallback_application: &str,
) -> ApplicationVersion {
    ApplicationVersion {
        application_name: description
            .application_name()
            .unwrap_or(fallback_application)
            .to_string(),
        version_label: description.version_label().unwrap_or_default().to_string(),
        description: description.description().map(str::to_string),
        source_bundle: description.source_bundle().and_then(|location| {
            Some(SourceBundle {
                bucket: location.s3_bucket()?.to_string(),
                key: location.s3_key()?.to_string(),
            })
        }),
        status: description
            .status()
            .map(|s| VersionStatus::from_provider(s.as_str()))
            .unwrap_or(VersionStatus::Unknown("missing".to_string())),
    }
}

#[async_trait]
impl VersionOps for AwsProvider {
    async fn describe_application_version(
        &self,
        application: &ApplicationName,
        label: &VersionLabel,
    ) -> Result<Option<ApplicationVersion>, ProviderError> {
        let output = self
            .beanstalk
            .describe_application_versions()
            .application_name(application.as_str())
            .version_labels(label.as_str())
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .application_versions()
            .iter()
            .find(|v| v.version_label() == Some(label.as_str()))
            .map(|v| to_version(v, application.as_str())))
    }

    async fn create_application_version(
        &self,
        version: &NewApplicationVersion<'_>,
    ) -> Result<ApplicationVersion, ProviderError> {
        let bundle = S3Location::builder()
            .s3_bucket(&version.source_bundle.bucket)
            .s3_key(&version.source_bundle.key)
            .build();

        let output = self
            .beanstalk
            .create_application_version()
            .application_name(version.application_name.as_str())
            .version_label(version.version_label.as_str())
            .description(version.description)
            .source_bundle(bundle)
            .process(true)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(match output.application_version() {
            Some(created) => to_version(created, version.application_name.as_str()),
            None => ApplicationVersion {
                application_name: version.application_name.to_string(),
                version_label: version.version_label.to_string(),
                description: Some(version.description.to_string()),
                source_bundle: Some(version.source_bundle.clone()),
                status: VersionStatus::Processing,
            },
        })
    }

    async fn storage_location(&self) -> Result<String, ProviderError> {
        let output = self
            .beanstalk
            .create_storage_location()
            .send()
            .await
            .map_err(provider_error)?;

        output
            .s3_bucket()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::NotFound("storage location bucket".to_string()))
    }
}

#[async_trait]
impl EnvironmentOps for AwsProvider {
    async fn describe_environment(
        &self,
        environment: EnvironmentRef<'_>,
    ) -> Result<EnvironmentStatus, ProviderError> {
        let output = self
            .beanstalk
            .describe_environments()
            .application_name(environment.application_name.as_str())
            .environment_names(environment.environment_name.as_str())
            .send()
            .await
            .map_err(provider_error)?;

        // Recently terminated environments with the same name are listed too.
        let environments = output.environments();
        let description = environments
            .iter()
            .find(|e| e.status().is_some_and(|s| s.as_str() != "Terminated"))
            .or_else(|| environments.first())
            .ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "environment {} of application {}",
                    environment.environment_name, environment.application_name
                ))
            })?;

        Ok(EnvironmentStatus {
            environment_name: description
                .environment_name()
                .unwrap_or(environment.environment_name.as_str())
                .to_string(),
            health: description
                .health()
                .map(|h| Health::from_provider(h.as_str()))
                .unwrap_or(Health::Grey),
            status: description
                .status()
                .map(|s| Status::from_provider(s.as_str()))
                .unwrap_or(Status::Unknown("missing".to_string())),
            current_version_label: description.version_label().map(str::to_string),
        })
    }

    async fn describe_environment_health(
        &self,
        environment: &EnvironmentName,
    ) -> Result<Option<HealthDetail>, ProviderError> {
        let result = self
            .beanstalk
            .describe_environment_health()
            .environment_name(environment.as_str())
            .attribute_names(EnvironmentHealthAttribute::All)
            .send()
            .await;

        match result {
            Ok(output) => Ok(Some(HealthDetail {
                health_status: output.health_status().map(str::to_string),
                color: output.color().map(str::to_string),
                causes: output.causes().to_vec(),
            })),
            // Basic health reporting: no enhanced detail to show.
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_invalid_request_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(provider_error(err)),
        }
    }

    async fn describe_events(
        &self,
        environment: EnvironmentRef<'_>,
        since: DateTime<Utc>,
    ) -> Result<Vec<EnvironmentEvent>, ProviderError> {
        let output = self
            .beanstalk
            .describe_events()
            .application_name(environment.application_name.as_str())
            .environment_name(environment.environment_name.as_str())
            .start_time(SmithyDateTime::from_millis(since.timestamp_millis()))
            .max_records(100)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .events()
            .iter()
            .filter_map(|event| {
                Some(EnvironmentEvent {
                    date: to_chrono(event.event_date()?)?,
                    severity: event
                        .severity()
                        .map(|s| EventSeverity::from_provider(s.as_str()))
                        .unwrap_or(EventSeverity::Info),
                    message: event.message().unwrap_or_default().to_string(),
                    version_label: event.version_label().map(str::to_string),
                })
            })
            .collect())
    }

    async fn update_environment(
        &self,
        environment: EnvironmentRef<'_>,
        label: &VersionLabel,
    ) -> Result<(), ProviderError> {
        self.beanstalk
            .update_environment()
            .application_name(environment.application_name.as_str())
            .environment_name(environment.environment_name.as_str())
            .version_label(label.as_str())
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}

#[async_trait]
impl BundleOps for AwsProvider {
    async fn put_bundle(
        &self,
        location: &SourceBundle,
        body: Vec<u8>,
    ) -> Result<(), ProviderError> {
        self.s3
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_type("application/zip")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}
