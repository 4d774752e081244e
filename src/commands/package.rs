// ABOUTME: Package command implementation.
// ABOUTME: Builds the deployment archive into the artifacts directory without remote calls.

use beanstalk_deploy::ci::CiEnvironment;
use beanstalk_deploy::config::{DeploymentPlan, Settings};
use beanstalk_deploy::error::Result;
use beanstalk_deploy::output::Output;
use beanstalk_deploy::pipeline;

use crate::cli::InputArgs;

pub fn package(args: InputArgs, mut output: Output) -> Result<i32> {
    output.start_timer();
    let ci = CiEnvironment::capture()?;
    let settings = Settings::resolve(args.into(), &ci)?;
    let plan = DeploymentPlan::load(&settings)?;

    let bundle = pipeline::package_plan(&plan)?;
    let path = bundle.write_to(&settings.artifacts_dir())?;

    output.success(&format!("Wrote {} ({} bytes)", path.display(), bundle.len()));
    Ok(0)
}
