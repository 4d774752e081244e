// ABOUTME: Remote provider abstraction for Elastic Beanstalk and bundle storage.
// ABOUTME: Exports capability traits, snapshot types, and the AWS SDK implementation.

mod aws;
mod error;
mod traits;
mod types;

pub use aws::AwsProvider;
pub use error::ProviderError;
pub use traits::{BundleOps, EnvironmentOps, VersionOps};
pub use types::{
    ApplicationVersion, EnvironmentEvent, EnvironmentRef, EnvironmentStatus, EventSeverity, Health,
    HealthDetail, NewApplicationVersion, SourceBundle, Status, VersionStatus,
};
