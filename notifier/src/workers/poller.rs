//! Poll driver: fixed-interval status polling until the job is terminal

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::control::{BuildControl, DeployControl};
use crate::errors::NotifierError;
use crate::messages::Messages;
use crate::progress::ProgressChannel;
use crate::sink::MessageSink;
use crate::tracker::{JobKind, JobSnapshot, PhaseObservation, PhaseTracker};

/// Poller options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay before every poll
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Where snapshots come from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<JobSnapshot, NotifierError>;
}

/// Snapshots of one CodeBuild build
pub struct BuildSource<'a, C: ?Sized> {
    control: &'a C,
    build_id: String,
}

impl<'a, C: BuildControl + ?Sized> BuildSource<'a, C> {
    pub fn new(control: &'a C, build_id: &str) -> Self {
        Self {
            control,
            build_id: build_id.to_string(),
        }
    }
}

#[async_trait]
impl<'a, C: BuildControl + ?Sized> SnapshotSource for BuildSource<'a, C> {
    async fn fetch(&self) -> Result<JobSnapshot, NotifierError> {
        let build = self.control.get_build(&self.build_id).await?;
        Ok(JobSnapshot {
            phases: build.observations(),
            status: build.build_status,
            targets: Vec::new(),
        })
    }
}

/// Snapshots of one CodeDeploy deployment across all its instances
pub struct DeploySource<'a, C: ?Sized> {
    control: &'a C,
    deployment_id: String,
}

impl<'a, C: DeployControl + ?Sized> DeploySource<'a, C> {
    pub fn new(control: &'a C, deployment_id: &str) -> Self {
        Self {
            control,
            deployment_id: deployment_id.to_string(),
        }
    }

    /// Lifecycle events of every listed instance
    pub async fn targets_snapshot(&self, status: String) -> Result<JobSnapshot, NotifierError> {
        let target_ids = self.control.list_targets(&self.deployment_id).await?;
        let summaries = self
            .control
            .batch_get_targets(&self.deployment_id, &target_ids)
            .await?;

        let phases: Vec<PhaseObservation> = summaries
            .iter()
            .flat_map(|summary| summary.observations())
            .collect();
        let targets = summaries
            .iter()
            .map(|summary| summary.short_id().to_string())
            .collect();

        Ok(JobSnapshot {
            status,
            phases,
            targets,
        })
    }
}

#[async_trait]
impl<'a, C: DeployControl + ?Sized> SnapshotSource for DeploySource<'a, C> {
    async fn fetch(&self) -> Result<JobSnapshot, NotifierError> {
        let status = self
            .control
            .get_deployment_status(&self.deployment_id)
            .await?;
        if JobKind::Deploy.is_terminal(&status) {
            return Ok(JobSnapshot {
                status,
                ..Default::default()
            });
        }
        self.targets_snapshot(status).await
    }
}

/// How the tracked job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: String,
    pub succeeded: bool,
}

/// Poll until the job reaches a terminal status, pushing every reported phase.
///
/// Transient source errors skip the tick and are retried after the same
/// interval, without limit. Any other error, including sink failures, ends
/// the loop.
pub async fn run<Src, Snk, S, F>(
    options: &Options,
    source: &Src,
    tracker: &mut PhaseTracker,
    channel: &mut ProgressChannel<Snk>,
    messages: &Messages,
    initial_status: &str,
    sleep_fn: S,
) -> Result<Outcome, NotifierError>
where
    Src: SnapshotSource + ?Sized,
    Snk: MessageSink,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let kind = messages.kind();
    let mut status = initial_status.to_string();

    while !kind.is_terminal(&status) {
        debug!("Sleeping for {:?}...", options.interval);
        sleep_fn(options.interval).await;

        let snapshot = match source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_transient() => {
                warn!("{}, retrying in {:?}", e, options.interval);
                continue;
            }
            Err(e) => return Err(e),
        };

        status = snapshot.status;
        if kind.is_terminal(&status) {
            break;
        }

        for target in &snapshot.targets {
            tracker.ensure_target(Some(target));
        }

        for report in tracker.observe(&snapshot.phases) {
            info!("Reporting phase {} = {} ({:?})", report.key, report.status, report.target);
            channel.set_percentage(report.percentage).await?;
            channel.log(&messages.phase(&report)).await?;
        }
    }

    info!("{} finished with status {}", kind.noun(), status);
    channel.set_percentage(tracker.finish()).await?;
    channel.log(&messages.finished(&status)).await?;

    Ok(Outcome {
        succeeded: kind.is_success(&status),
        status,
    })
}
