// ABOUTME: Snapshot of the CI process environment, captured once at startup.
// ABOUTME: Also appends step outputs to the file named by GITHUB_OUTPUT.

use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;

/// Environment variables the action reads, captured once.
///
/// Empty values count as unset, which is how CI runners pass absent inputs.
/// The wait flag is the exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
    pub github_sha: Option<String>,
    pub github_run_number: Option<String>,
    pub github_workspace: Option<PathBuf>,
    pub github_output: Option<PathBuf>,
    pub aws_region: Option<String>,
    pub aws_default_region: Option<String>,
    /// Raw `INPUT_WAIT_FOR_DEPLOYMENT`. Kept even when empty, since empty means false.
    pub wait_for_deployment: Option<String>,
    pub current_dir: PathBuf,
}

impl CiEnvironment {
    pub fn capture() -> Result<Self> {
        Ok(Self {
            github_sha: var("GITHUB_SHA"),
            github_run_number: var("GITHUB_RUN_NUMBER"),
            github_workspace: var("GITHUB_WORKSPACE").map(PathBuf::from),
            github_output: var("GITHUB_OUTPUT").map(PathBuf::from),
            aws_region: var("AWS_REGION"),
            aws_default_region: var("AWS_DEFAULT_REGION"),
            wait_for_deployment: std::env::var("INPUT_WAIT_FOR_DEPLOYMENT").ok(),
            current_dir: std::env::current_dir()?,
        })
    }

    /// Append `key=value` lines to the step output file, if there is one.
    pub fn write_outputs(&self, outputs: &[(&str, &str)]) -> Result<()> {
        let Some(path) = &self.github_output else {
            return Ok(());
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        for (key, value) in outputs {
            writeln!(file, "{key}={value}")?;
        }
        tracing::debug!(path = %path.display(), count = outputs.len(), "wrote step outputs");
        Ok(())
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_treats_empty_values_as_unset() {
        temp_env::with_vars(
            [("GITHUB_SHA", Some("")), ("AWS_REGION", Some("us-east-1"))],
            || {
                let env = CiEnvironment::capture().unwrap();
                assert_eq!(env.github_sha, None);
                assert_eq!(env.aws_region.as_deref(), Some("us-east-1"));
            },
        );
    }

    #[test]
    fn write_outputs_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "existing=1\n").unwrap();

        let env = CiEnvironment {
            github_output: Some(path.clone()),
            ..Default::default()
        };
        env.write_outputs(&[("version_label", "abc123")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing=1\nversion_label=abc123\n");
    }

    #[test]
    fn write_outputs_without_file_is_noop() {
        let env = CiEnvironment::default();
        env.write_outputs(&[("a", "b")]).unwrap();
    }
}
