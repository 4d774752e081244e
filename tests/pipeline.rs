// ABOUTME: End-to-end pipeline tests against the scripted provider.
// ABOUTME: Covers both config shapes, image builds, waiting, and re-runs of a label.

mod support;

use beanstalk_deploy::ci::CiEnvironment;
use beanstalk_deploy::config::{DeploymentPlan, Inputs, Settings};
use beanstalk_deploy::deploy::DeploymentResult;
use beanstalk_deploy::diagnostics::Diagnostics;
use beanstalk_deploy::error::Error;
use beanstalk_deploy::output::{Output, OutputMode};
use beanstalk_deploy::pipeline;
use beanstalk_deploy::provider::{Health, Status, VersionStatus};
use std::fs;
use std::path::{Path, PathBuf};
use support::{BUCKET, LABEL, MockBuilder, MockProvider, env_status, version};

const CONFIG: &str = r#"{
    "application_name": "demo",
    "environment_name": "demo-dev",
    "application_version_bucket": "versions-bucket",
    "build_and_upload_image": BUILD,
    "containers": [
        {
            "name": "web",
            "dockerfile": "Dockerfile",
            "image_base_name": "123456789012.dkr.ecr.eu-central-1.amazonaws.com/web",
            "ports": [{"host": 80, "container": 8080}],
            "links": ["worker"]
        },
        {
            "name": "worker",
            "dockerfile": "worker/Dockerfile",
            "image_base_name": "123456789012.dkr.ecr.eu-central-1.amazonaws.com/worker",
            "memory": 512
        }
    ]
}"#;

fn write_config(dir: &Path, build: bool) {
    let config = CONFIG.replace("BUILD", if build { "true" } else { "false" });
    fs::write(dir.join("deploy.json"), config).unwrap();
}

fn file_settings(dir: &Path, wait: bool) -> Settings {
    let inputs = Inputs {
        config_path: Some(PathBuf::from("deploy.json")),
        version_label: Some(LABEL.to_string()),
        wait_for_deployment: Some(wait),
        ..Default::default()
    };
    resolve(dir, inputs)
}

fn resolve(dir: &Path, inputs: Inputs) -> Settings {
    let ci = CiEnvironment {
        current_dir: dir.to_path_buf(),
        github_run_number: Some("7".to_string()),
        ..Default::default()
    };
    Settings::resolve(inputs, &ci).unwrap()
}

async fn run(
    settings: &Settings,
    provider: &MockProvider,
    builder: &MockBuilder,
) -> beanstalk_deploy::error::Result<beanstalk_deploy::deploy::DeploymentOutcome> {
    let plan = DeploymentPlan::load(settings)?;
    let output = Output::new(OutputMode::Quiet);
    let mut diag = Diagnostics::default();
    pipeline::run(&plan, settings, provider, provider, builder, &output, &mut diag).await
}

#[tokio::test(start_paused = true)]
async fn wait_disabled_reports_success_without_polling() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), false);
    let provider =
        MockProvider::new().with_environments([env_status(Status::Ready, Health::Green, "old")]);
    let builder = MockBuilder::new();

    let outcome = run(&file_settings(dir.path(), false), &provider, &builder)
        .await
        .unwrap();

    assert_eq!(outcome.result, DeploymentResult::Success);
    assert_eq!(outcome.polls, 0);
    assert!(outcome.final_status.is_none());

    let calls = provider.calls();
    assert_eq!(calls.put_bundle, 1);
    assert_eq!(calls.create_version, 1);
    assert_eq!(calls.update_environment, 1);
    assert_eq!(calls.describe_events, 0);
    assert!(builder.built().is_empty());
}

#[tokio::test(start_paused = true)]
async fn uploads_archive_and_keeps_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), false);
    let provider =
        MockProvider::new().with_environments([env_status(Status::Ready, Health::Green, "old")]);

    run(&file_settings(dir.path(), false), &provider, &MockBuilder::new())
        .await
        .unwrap();

    let uploads = provider.uploads();
    assert_eq!(uploads.len(), 1);
    let (location, body) = &uploads[0];
    assert_eq!(location.bucket, BUCKET);
    assert_eq!(location.key, "deploy-abc123.zip");

    let local = dir.path().join(".build-artifacts/deploy-abc123.zip");
    assert_eq!(&fs::read(local).unwrap(), body);
}

#[tokio::test(start_paused = true)]
async fn demo_scenario_is_stable_after_two_polls() {
    support::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), false);
    let provider = MockProvider::new().with_environments([
        // Read by the updater before requesting the update.
        env_status(Status::Ready, Health::Green, "old"),
        env_status(Status::Updating, Health::Grey, "old"),
        env_status(Status::Ready, Health::Green, LABEL),
    ]);

    let outcome = run(&file_settings(dir.path(), true), &provider, &MockBuilder::new())
        .await
        .unwrap();

    assert_eq!(outcome.result, DeploymentResult::Success);
    assert_eq!(outcome.polls, 2);
    assert_eq!(outcome.result.exit_code(), 0);
}

#[tokio::test(start_paused = true)]
async fn red_environment_fails_with_non_zero_exit() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), false);
    let provider = MockProvider::new().with_environments([
        env_status(Status::Ready, Health::Green, "old"),
        env_status(Status::Updating, Health::Red, "old"),
    ]);

    let outcome = run(&file_settings(dir.path(), true), &provider, &MockBuilder::new())
        .await
        .unwrap();

    assert_eq!(outcome.result, DeploymentResult::Failed);
    assert_eq!(outcome.polls, 1);
    assert_eq!(outcome.result.exit_code(), 2);
}

#[tokio::test(start_paused = true)]
async fn rerun_of_deployed_label_makes_no_mutating_calls() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), false);
    let existing = version(
        LABEL,
        support::bundle("deploy-abc123.zip"),
        VersionStatus::Processed,
    );
    let provider = MockProvider::new()
        .with_version(existing)
        .with_environments([env_status(Status::Ready, Health::Green, LABEL)]);

    let outcome = run(&file_settings(dir.path(), true), &provider, &MockBuilder::new())
        .await
        .unwrap();

    assert_eq!(outcome.result, DeploymentResult::Success);
    assert_eq!(outcome.polls, 1);
    let calls = provider.calls();
    assert_eq!(calls.create_version, 0);
    assert_eq!(calls.update_environment, 0);
}

#[tokio::test(start_paused = true)]
async fn builds_every_container_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), true);
    let provider =
        MockProvider::new().with_environments([env_status(Status::Ready, Health::Green, "old")]);
    let builder = MockBuilder::new();

    run(&file_settings(dir.path(), false), &provider, &builder)
        .await
        .unwrap();

    assert_eq!(builder.built(), vec!["web".to_string(), "worker".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn build_failure_stops_before_any_remote_call() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), true);
    let provider = MockProvider::new();
    let builder = MockBuilder::failing_on("worker");

    let err = run(&file_settings(dir.path(), false), &provider, &builder)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Build(_)));
    assert_eq!(provider.calls(), support::Calls::default());
}

#[tokio::test(start_paused = true)]
async fn compose_without_bucket_uses_storage_location() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("docker-compose.yml"),
        "services:\n  web:\n    image: nginx:1.27\n    ports:\n      - \"80:80\"\n",
    )
    .unwrap();
    let provider = MockProvider::new()
        .with_storage_bucket("elasticbeanstalk-eu-central-1-123456789012")
        .with_environments([env_status(Status::Ready, Health::Green, "old")]);

    let settings = resolve(
        dir.path(),
        Inputs {
            application_name: Some("demo".to_string()),
            environment_name: Some("demo-dev".to_string()),
            docker_compose_path: Some(PathBuf::from("docker-compose.yml")),
            version_label: Some(LABEL.to_string()),
            wait_for_deployment: Some(false),
            ..Default::default()
        },
    );

    let outcome = run(&settings, &provider, &MockBuilder::new()).await.unwrap();

    assert_eq!(outcome.result, DeploymentResult::Success);
    assert_eq!(provider.calls().storage_location, 1);
    let uploads = provider.uploads();
    assert_eq!(
        uploads[0].0.bucket,
        "elasticbeanstalk-eu-central-1-123456789012"
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_upload_stops_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), false);
    let provider = MockProvider::new().with_put_error(
        beanstalk_deploy::provider::ProviderError::NotFound("NoSuchBucket".to_string()),
    );

    let err = run(&file_settings(dir.path(), false), &provider, &MockBuilder::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Deploy(_)));
    assert_eq!(provider.calls().create_version, 0);
    assert!(err.to_string().contains("s3://versions-bucket/deploy-abc123.zip"));
}
