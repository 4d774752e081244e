// ABOUTME: ImageBuilder backed by the docker CLI.
// ABOUTME: Streams build and push output to stderr; logs into ECR once per registry.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{BuildError, ImageBuilder};
use crate::config::ContainerConfig;
use crate::types::{ImageRef, VersionLabel};

pub struct DockerCli {
    docker: String,
    aws: String,
    logged_in: Mutex<HashSet<String>>,
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_programs("docker", "aws")
    }

    /// Use specific binaries instead of whatever is first on `PATH`.
    pub fn with_programs(docker: impl Into<String>, aws: impl Into<String>) -> Self {
        Self {
            docker: docker.into(),
            aws: aws.into(),
            logged_in: Mutex::new(HashSet::new()),
        }
    }

    async fn ensure_login(&self, image: &ImageRef) -> Result<(), BuildError> {
        let repository = image.repository();
        let (Some(registry), Some(region)) = (repository.registry(), repository.ecr_region()) else {
            return Ok(());
        };
        if self.logged_in.lock().contains(registry) {
            return Ok(());
        }

        tracing::debug!(registry, region, "logging into ECR");
        let password = capture(
            &self.aws,
            &["ecr", "get-login-password", "--region", region],
            None,
        )
        .await?;
        capture(
            &self.docker,
            &["login", "--username", "AWS", "--password-stdin", registry],
            Some(&password),
        )
        .await?;

        self.logged_in.lock().insert(registry.to_string());
        Ok(())
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build_and_push(
        &self,
        container: &ContainerConfig,
        version: &VersionLabel,
        base_path: &Path,
    ) -> Result<ImageRef, BuildError> {
        let image = container
            .image(version)
            .map_err(|source| BuildError::Image {
                container: container.name.clone(),
                source,
            })?;

        let dockerfile = base_path.join(&container.dockerfile);
        if !dockerfile.is_file() {
            return Err(BuildError::MissingDockerfile {
                container: container.name.clone(),
                path: dockerfile,
            });
        }

        let local_tag = container.local_tag();
        let remote_tag = image.to_string();
        let dockerfile = dockerfile.to_string_lossy();
        let context = base_path.to_string_lossy();

        tracing::info!(container = %container.name, image = %remote_tag, "building image");
        stream(
            &self.docker,
            &["build", "-t", &local_tag, "-f", &dockerfile, &context],
        )
        .await?;
        stream(&self.docker, &["tag", &local_tag, &remote_tag]).await?;

        self.ensure_login(&image).await?;
        stream(&self.docker, &["push", &remote_tag]).await?;

        Ok(image)
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    format!("{program} {}", args.join(" "))
}

fn spawn_error(program: &str) -> impl Fn(std::io::Error) -> BuildError + '_ {
    move |source| BuildError::Spawn {
        program: program.to_string(),
        source,
    }
}

/// Run a command with its output passed through to our stderr.
///
/// Stdout is redirected too so that JSON output on our stdout stays parseable.
async fn stream(program: &str, args: &[&str]) -> Result<(), BuildError> {
    let command_line = command_line(program, args);
    tracing::debug!(command = %command_line, "running");

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(std::io::stderr())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(spawn_error(program))?;

    if !status.success() {
        return Err(BuildError::Exited {
            command: command_line,
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Run a command to completion and return its stdout.
async fn capture(
    program: &str,
    args: &[&str],
    stdin: Option<&[u8]>,
) -> Result<Vec<u8>, BuildError> {
    let command_line = command_line(program, args);
    tracing::debug!(command = %command_line, "running");
    let spawn_error = spawn_error(program);

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(&spawn_error)?;

    if let Some(input) = stdin
        && let Some(mut pipe) = child.stdin.take()
    {
        pipe.write_all(input).await.map_err(&spawn_error)?;
        // Closing stdin lets `docker login --password-stdin` proceed.
        drop(pipe);
    }

    let output = child.wait_with_output().await.map_err(&spawn_error)?;
    if !output.status.success() {
        return Err(BuildError::CommandFailed {
            command: command_line,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn streamed_failure_reports_exit_status() {
        let err = stream("sh", &["-c", "echo building; exit 3"]).await.unwrap_err();

        match err {
            BuildError::Exited { command, status } => {
                assert!(command.starts_with("sh -c"));
                assert!(status.contains('3'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn streamed_success_returns_unit() {
        stream("sh", &["-c", "echo step 1/1; echo done >&2"]).await.unwrap();
    }

    #[tokio::test]
    async fn captured_command_returns_stdout() {
        let out = capture("sh", &["-c", "cat"], Some(b"token")).await.unwrap();
        assert_eq!(out, b"token");
    }

    #[tokio::test]
    async fn captured_failure_keeps_stderr() {
        let err = capture("sh", &["-c", "echo denied >&2; exit 1"], None)
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::CommandFailed { stderr, .. } if stderr == "denied"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = stream("definitely-not-a-real-binary", &[]).await.unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }
}
