// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Every input can also come from the INPUT_* variable a CI action runner sets.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use beanstalk_deploy::config::{Inputs, parse_flag};
use beanstalk_deploy::output::OutputMode;

#[derive(Parser)]
#[command(name = "beanstalk-deploy")]
#[command(about = "Build, register, and roll out container versions on AWS Elastic Beanstalk")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build images, upload the archive, register the version, and update the environment
    Deploy(InputArgs),

    /// Build the deployment archive locally without calling AWS
    Package(InputArgs),

    /// Show the environment's current status and health
    Status(InputArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Elastic Beanstalk application name
    #[arg(long, env = "INPUT_APPLICATION_NAME")]
    pub application_name: Option<String>,

    /// Elastic Beanstalk environment name
    #[arg(long, env = "INPUT_ENVIRONMENT_NAME")]
    pub environment_name: Option<String>,

    /// JSON deployment config with a container list
    #[arg(long, env = "INPUT_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// docker-compose file to deploy instead of a config file
    #[arg(long, env = "INPUT_DOCKER_COMPOSE_PATH")]
    pub docker_compose_path: Option<PathBuf>,

    /// Directory bundled as .platform/ next to the compose file
    #[arg(long, env = "INPUT_PLATFORM_HOOKS_PATH")]
    pub platform_hooks_path: Option<PathBuf>,

    /// S3 bucket for application versions
    #[arg(long, env = "INPUT_APPLICATION_VERSION_BUCKET")]
    pub application_version_bucket: Option<String>,

    /// Version label (defaults to GITHUB_SHA)
    #[arg(long, env = "INPUT_VERSION_LABEL")]
    pub version_label: Option<String>,

    /// Version description (defaults to the CI run number)
    #[arg(long, env = "INPUT_VERSION_DESCRIPTION")]
    pub version_description: Option<String>,

    /// AWS region (defaults to AWS_REGION, then AWS_DEFAULT_REGION)
    #[arg(long, env = "INPUT_AWS_REGION")]
    pub aws_region: Option<String>,

    /// Wait for the environment to settle ("", "0", "false" disable)
    #[arg(long, value_parser = parse_flag)]
    pub wait_for_deployment: Option<bool>,

    /// Maximum time to wait for the environment, e.g. "20m"
    #[arg(long, env = "INPUT_WAIT_TIMEOUT", value_parser = parse_duration)]
    pub wait_timeout: Option<Duration>,

    /// Time between environment polls, e.g. "8s"
    #[arg(long, env = "INPUT_POLL_INTERVAL", value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Directory Dockerfiles and relative paths are resolved against
    #[arg(long, env = "INPUT_BASE_PATH")]
    pub base_path: Option<PathBuf>,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value.trim()).map_err(|e| e.to_string())
}

impl From<InputArgs> for Inputs {
    fn from(args: InputArgs) -> Self {
        Inputs {
            application_name: args.application_name,
            environment_name: args.environment_name,
            config_path: args.config_path,
            docker_compose_path: args.docker_compose_path,
            platform_hooks_path: args.platform_hooks_path,
            version_bucket: args.application_version_bucket,
            version_label: args.version_label,
            version_description: args.version_description,
            aws_region: args.aws_region,
            wait_for_deployment: args.wait_for_deployment,
            wait_timeout: args.wait_timeout,
            poll_interval: args.poll_interval,
            base_path: args.base_path,
        }
    }
}
