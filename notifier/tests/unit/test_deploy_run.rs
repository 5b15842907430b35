//! Deploy runs driven end to end

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use deploy_notifier::app::options::{CommitSource, DeployOptions, DeploymentTarget};
use deploy_notifier::app::run::run_deploy;
use deploy_notifier::errors::NotifierError;

use crate::fakes::{instance, run_options, FakeDeploy, FakeIdentity, RecordingSink, SinkWrite};

const EVENTS: [&str; 4] = ["ApplicationStop", "DownloadBundle", "Install", "AfterInstall"];

fn all(status: &str) -> Vec<(&'static str, &str)> {
    EVENTS.iter().map(|e| (*e, status)).collect()
}

fn existing(expected_phases: usize) -> DeployOptions {
    DeployOptions {
        deployment_group: "prod".to_string(),
        target: DeploymentTarget::Existing("d-EXISTING1".to_string()),
        expected_phases,
    }
}

fn targets() -> Result<Vec<String>, NotifierError> {
    Ok(vec!["i-aaa".to_string(), "i-bbb".to_string()])
}

fn unavailable() -> Result<Vec<String>, NotifierError> {
    Err(NotifierError::TargetsUnavailable("InvalidDeploymentIdException".to_string()))
}

fn log_lines(text: &str) -> Vec<&str> {
    // header, bar, then logs
    text.lines().skip(2).collect()
}

#[tokio::test]
async fn test_two_instances_with_failure() {
    let control = FakeDeploy::new(
        &["Created", "InProgress", "InProgress", "Failed"],
        vec![unavailable(), targets(), targets(), targets()],
        vec![
            vec![
                instance("i-aaa", Some("Blue"), &all("Pending")),
                instance("i-bbb", None, &all("Pending")),
            ],
            vec![
                instance(
                    "i-aaa",
                    Some("Blue"),
                    &[
                        ("ApplicationStop", "Succeeded"),
                        ("DownloadBundle", "Failed"),
                        ("Install", "Skipped"),
                        ("AfterInstall", "Skipped"),
                    ],
                ),
                instance(
                    "i-bbb",
                    None,
                    &[
                        ("ApplicationStop", "Succeeded"),
                        ("DownloadBundle", "InProgress"),
                        ("Install", "Pending"),
                        ("AfterInstall", "Pending"),
                    ],
                ),
            ],
            vec![
                instance("i-aaa", Some("Blue"), &all("Skipped")),
                instance("i-bbb", None, &all("Succeeded")),
            ],
        ],
    );
    let sink = Arc::new(RecordingSink::new());
    let sleeps = AtomicUsize::new(0);

    let outcome = run_deploy(
        &control,
        &FakeIdentity::user("jane"),
        sink.clone(),
        &run_options(),
        &existing(8),
        |_| {
            sleeps.fetch_add(1, Ordering::SeqCst);
            async {}
        },
    )
    .await
    .unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.status, "Failed");
    // one retry while seeding, then three polls
    assert_eq!(sleeps.load(Ordering::SeqCst), 4);
    assert!(control.created.lock().unwrap().is_empty());
    assert!(control
        .status_calls
        .lock()
        .unwrap()
        .iter()
        .all(|id| id == "d-EXISTING1"));

    let text = sink.last_text().unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().contains("*CodeDeploy: web - prod*"));
    assert!(lines.next().unwrap().ends_with(" 100%"));

    let logs = log_lines(&text);
    assert_eq!(logs.len(), 10);
    assert!(logs[0].ends_with("[Deploy: *web*, DeploymentStatus=`Created`, Initiated by: <@U012AB3CD>]"));

    // i-aaa is walked first; the failure does not stop i-bbb from being reported
    assert!(logs[1].contains("Deployment's Phase: ApplicationStop, [:blue_book: "));
    assert!(logs[2].contains("Phase: DownloadBundle, [:blue_book: "));
    assert!(logs[2].ends_with("PhaseStatus=*Failed*]"));
    assert!(logs[5].contains("Phase: ApplicationStop, [:green_book: "));
    assert!(logs[5].contains("|*i-bbb*>"));

    // i-bbb's remaining events come in on the next poll, in ledger order
    assert!(logs[6].contains("Phase: DownloadBundle, [:green_book: "));
    assert!(logs[7].contains("Phase: Install, [:green_book: "));
    assert!(logs[8].contains("Phase: AfterInstall, [:green_book: "));
    assert!(logs[9].ends_with("[Deploy: *web*, DeploymentStatus=`Failed`:red_circle:]"));

    assert!(sink.thread_replies()[0].contains("*Failed!* <@U012AB3CD>"));
}

#[tokio::test]
async fn test_progress_steps_for_thirteen_phases() {
    let control = FakeDeploy::new(
        &["InProgress", "InProgress", "Succeeded"],
        vec![Ok(vec!["i-aaa".to_string()]), Ok(vec!["i-aaa".to_string()])],
        vec![
            vec![instance("i-aaa", None, &all("Pending"))],
            vec![instance(
                "i-aaa",
                None,
                &[
                    ("ApplicationStop", "Succeeded"),
                    ("DownloadBundle", "Succeeded"),
                    ("Install", "Succeeded"),
                    ("AfterInstall", "InProgress"),
                ],
            )],
        ],
    );
    let sink = Arc::new(RecordingSink::new());

    let outcome = run_deploy(
        &control,
        &FakeIdentity::user("jane"),
        sink.clone(),
        &run_options(),
        &existing(13),
        |_| async {},
    )
    .await
    .unwrap();
    assert!(outcome.succeeded);

    let bars: Vec<String> = sink
        .writes()
        .iter()
        .filter_map(|w| match w {
            SinkWrite::Update { text, .. } => text.lines().nth(1).map(str::to_string),
            _ => None,
        })
        .collect();
    assert!(bars.iter().any(|b| b.ends_with(" 7.7%")));
    assert!(bars.iter().any(|b| b.ends_with(" 15.4%")));
    assert!(bars.iter().any(|b| b.ends_with(" 23.1%")));
    assert!(bars.last().unwrap().ends_with(" 100%"));

    let text = sink.last_text().unwrap();
    assert!(log_lines(&text)
        .last()
        .unwrap()
        .ends_with("DeploymentStatus=`Succeeded`:large_blue_circle:]"));
}

#[tokio::test]
async fn test_creates_deployment_for_commit() {
    let control = FakeDeploy::new(
        &["Created", "Succeeded"],
        vec![Ok(Vec::new())],
        vec![Vec::new()],
    );
    let sink = Arc::new(RecordingSink::new());
    let deploy = DeployOptions {
        deployment_group: "prod".to_string(),
        target: DeploymentTarget::Create {
            commit: CommitSource::Commit("abc123".to_string()),
            repository_owner: "acme".to_string(),
            deployment_config_name: "CodeDeployDefault.AllAtOnce".to_string(),
        },
        expected_phases: 13,
    };

    let outcome = run_deploy(
        &control,
        &FakeIdentity::user("jane"),
        sink.clone(),
        &run_options(),
        &deploy,
        |_| async {},
    )
    .await
    .unwrap();
    assert!(outcome.succeeded);

    let created = control.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].application_name, "web");
    assert_eq!(created[0].deployment_group_name, "prod");
    assert_eq!(created[0].repository, "acme/web");
    assert_eq!(created[0].commit_id, "abc123");
    assert_eq!(created[0].description, "Initiated by deploy-notifier - by jane");
    assert!(control
        .status_calls
        .lock()
        .unwrap()
        .iter()
        .all(|id| id == "d-CREATED01"));
    assert!(sink.thread_replies()[0].contains("deployments/d-CREATED01?region=eu-west-1"));
}

#[tokio::test]
async fn test_transient_errors_retried_mid_run() {
    let control = FakeDeploy::new(
        &["InProgress", "InProgress", "InProgress", "Succeeded"],
        vec![Ok(vec!["i-aaa".to_string()]), unavailable(), Ok(vec!["i-aaa".to_string()])],
        vec![
            vec![instance("i-aaa", None, &all("Pending"))],
            vec![instance("i-aaa", None, &all("Succeeded"))],
        ],
    );
    let sink = Arc::new(RecordingSink::new());

    let outcome = run_deploy(
        &control,
        &FakeIdentity::user("jane"),
        sink.clone(),
        &run_options(),
        &existing(4),
        |_| async {},
    )
    .await
    .unwrap();

    assert!(outcome.succeeded);
    let text = sink.last_text().unwrap();
    assert_eq!(log_lines(&text).len(), 6);
}
