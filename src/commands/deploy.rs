// ABOUTME: Deploy command implementation.
// ABOUTME: Resolves inputs, runs the pipeline against AWS, and reports the outcome.

use beanstalk_deploy::build::DockerCli;
use beanstalk_deploy::ci::CiEnvironment;
use beanstalk_deploy::config::{DeploymentPlan, Settings};
use beanstalk_deploy::diagnostics::{Diagnostics, Warning};
use beanstalk_deploy::error::Result;
use beanstalk_deploy::output::Output;
use beanstalk_deploy::pipeline;
use beanstalk_deploy::provider::AwsProvider;

use crate::cli::InputArgs;

/// Run a full deployment. Returns the process exit code for the outcome.
pub async fn deploy(args: InputArgs, mut output: Output) -> Result<i32> {
    output.start_timer();
    let ci = CiEnvironment::capture()?;
    let settings = Settings::resolve(args.into(), &ci)?;
    let plan = DeploymentPlan::load(&settings)?;
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying version {} in {}",
        plan.version_label, settings.region
    ));

    let provider = AwsProvider::connect(&settings.region).await;
    let builder = DockerCli::new();
    let result = pipeline::run(
        &plan, &settings, &provider, &provider, &builder, &output, &mut diag,
    )
    .await;

    let result_name = match &result {
        Ok(outcome) => outcome.result.as_str(),
        Err(_) => "error",
    };
    if let Err(e) = ci.write_outputs(&[
        ("version_label", plan.version_label.as_str()),
        ("deployment_result", result_name),
    ]) {
        diag.warn(Warning::ci_output(format!("could not write step outputs: {e}")));
    }

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let outcome = result?;
    output.outcome(&outcome);
    Ok(outcome.result.exit_code())
}
