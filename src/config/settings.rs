// ABOUTME: Action inputs resolved against the captured CI environment.
// ABOUTME: Produces the immutable Settings every pipeline stage reads from.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ci::CiEnvironment;
use crate::error::{Error, Result};
use crate::types::{ApplicationName, EnvironmentName, VersionLabel};

use super::FileConfig;

pub const DEFAULT_REGION: &str = "eu-central-1";

/// Raw inputs as given on the command line or through `INPUT_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub application_name: Option<String>,
    pub environment_name: Option<String>,
    pub config_path: Option<PathBuf>,
    pub docker_compose_path: Option<PathBuf>,
    pub platform_hooks_path: Option<PathBuf>,
    pub version_bucket: Option<String>,
    pub version_label: Option<String>,
    pub version_description: Option<String>,
    pub aws_region: Option<String>,
    /// Explicit flag value. Falls back to `INPUT_WAIT_FOR_DEPLOYMENT`, then true.
    pub wait_for_deployment: Option<bool>,
    pub wait_timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
    pub base_path: Option<PathBuf>,
}

/// Where the deployment is described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// JSON config file with a container list.
    File(PathBuf),
    /// A docker-compose file plus optional platform hooks.
    Compose {
        compose_file: PathBuf,
        platform_hooks: Option<PathBuf>,
    },
}

/// Resolved, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: ConfigSource,
    pub application_name: Option<String>,
    pub environment_name: Option<String>,
    pub version_bucket: Option<String>,
    pub version_label: VersionLabel,
    pub version_description: String,
    pub region: String,
    pub wait_for_deployment: bool,
    pub wait_timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
    pub base_path: PathBuf,
}

impl Settings {
    pub fn resolve(inputs: Inputs, ci: &CiEnvironment) -> Result<Self> {
        let base_path = base_path(inputs.base_path, ci);

        let source = match (inputs.config_path, inputs.docker_compose_path) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidConfig(
                    "config_path and docker_compose_path are mutually exclusive".to_string(),
                ));
            }
            (None, None) => return Err(Error::MissingInput("config_path or docker_compose_path")),
            (Some(path), None) => {
                if inputs.platform_hooks_path.is_some() {
                    return Err(Error::InvalidConfig(
                        "platform_hooks_path requires docker_compose_path".to_string(),
                    ));
                }
                ConfigSource::File(absolutize(&base_path, &path))
            }
            (None, Some(path)) => ConfigSource::Compose {
                compose_file: absolutize(&base_path, &path),
                platform_hooks: inputs
                    .platform_hooks_path
                    .map(|hooks| absolutize(&base_path, &hooks)),
            },
        };

        let label = non_empty(inputs.version_label)
            .or_else(|| ci.github_sha.clone())
            .ok_or(Error::MissingInput("version_label"))?;
        let version_label =
            VersionLabel::new(&label).map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let version_description = non_empty(inputs.version_description).unwrap_or_else(|| {
            match &ci.github_run_number {
                Some(run) => format!("GitHub Actions run #{run}"),
                None => format!("Deployment of {version_label}"),
            }
        });

        let region = resolve_region(inputs.aws_region, ci);

        if let Some(interval) = inputs.poll_interval
            && interval.is_zero()
        {
            return Err(Error::InvalidConfig(
                "poll_interval must be greater than zero".to_string(),
            ));
        }

        Ok(Settings {
            source,
            application_name: non_empty(inputs.application_name),
            environment_name: non_empty(inputs.environment_name),
            version_bucket: non_empty(inputs.version_bucket),
            version_label,
            version_description,
            region,
            wait_for_deployment: inputs
                .wait_for_deployment
                .or_else(|| ci.wait_for_deployment.as_deref().map(flag_value))
                .unwrap_or(true),
            wait_timeout: inputs.wait_timeout,
            poll_interval: inputs.poll_interval,
            base_path,
        })
    }

    /// Directory local copies of deployment archives are written to.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.base_path.join(".build-artifacts")
    }
}

/// Region from the input, then `AWS_REGION`, then `AWS_DEFAULT_REGION`, then the default.
pub fn resolve_region(input: Option<String>, ci: &CiEnvironment) -> String {
    non_empty(input)
        .or_else(|| ci.aws_region.clone())
        .or_else(|| ci.aws_default_region.clone())
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Application and environment to inspect without deploying.
///
/// Names come from the inputs. Missing ones are read from the config file
/// when `config_path` is given; no version label or bucket is needed.
pub fn resolve_target(
    inputs: Inputs,
    ci: &CiEnvironment,
) -> Result<(ApplicationName, EnvironmentName)> {
    let mut application = non_empty(inputs.application_name);
    let mut environment = non_empty(inputs.environment_name);

    if (application.is_none() || environment.is_none())
        && let Some(path) = inputs.config_path.filter(|p| !p.as_os_str().is_empty())
    {
        let base = base_path(inputs.base_path, ci);
        let file = FileConfig::load(&absolutize(&base, &path))?;
        application.get_or_insert_with(|| file.application_name.to_string());
        environment.get_or_insert_with(|| file.environment_name.to_string());
    }

    let application = application.ok_or(Error::MissingInput("application_name"))?;
    let environment = environment.ok_or(Error::MissingInput("environment_name"))?;
    Ok((
        ApplicationName::new(&application).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        EnvironmentName::new(&environment).map_err(|e| Error::InvalidConfig(e.to_string()))?,
    ))
}

fn base_path(input: Option<PathBuf>, ci: &CiEnvironment) -> PathBuf {
    let base = input
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| ci.github_workspace.clone())
        .unwrap_or_else(|| ci.current_dir.clone());
    absolutize(&ci.current_dir, &base)
}

/// Parse a CI-style boolean: "", "0", "false" and "False" are false.
pub fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    Ok(flag_value(value))
}

fn flag_value(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false" | "False" | "FALSE")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
