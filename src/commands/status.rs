// ABOUTME: Status command implementation.
// ABOUTME: Prints one snapshot of the environment's status and enhanced health.

use beanstalk_deploy::ci::CiEnvironment;
use beanstalk_deploy::config::{Inputs, resolve_region, resolve_target};
use beanstalk_deploy::deploy::snapshot;
use beanstalk_deploy::error::Result;
use beanstalk_deploy::output::Output;
use beanstalk_deploy::provider::{AwsProvider, EnvironmentRef};

use crate::cli::InputArgs;

pub async fn status(args: InputArgs, output: Output) -> Result<i32> {
    let ci = CiEnvironment::capture()?;
    let inputs: Inputs = args.into();
    let region = resolve_region(inputs.aws_region.clone(), &ci);
    let (application, environment) = resolve_target(inputs, &ci)?;

    let provider = AwsProvider::connect(&region).await;
    let (status, health) = snapshot(
        &provider,
        EnvironmentRef {
            application_name: &application,
            environment_name: &environment,
        },
    )
    .await?;

    output.environment(&status, health.as_ref());
    Ok(0)
}
