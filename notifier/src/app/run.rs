//! Build and deploy runs: set up, post the message, poll, summarize

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::app::options::{CommitSource, DeployOptions, DeploymentTarget, RunOptions};
use crate::control::models::CreateDeployment;
use crate::control::{BuildControl, CallerIdentity, DeployControl};
use crate::errors::NotifierError;
use crate::git::resolve_branch_head;
use crate::identity::resolve_initiator;
use crate::messages::Messages;
use crate::progress::{ChannelOptions, ProgressChannel};
use crate::sink::MessageSink;
use crate::tracker::snapshot::BUILD_PHASES;
use crate::tracker::{JobKind, JobSnapshot, PhaseTracker, TrackerSettings};
use crate::workers::poller::{self, BuildSource, DeploySource, Outcome};

async fn open_channel<Snk: MessageSink>(
    sink: Snk,
    options: &RunOptions,
    messages: &Messages,
) -> Result<ProgressChannel<Snk>, NotifierError> {
    let channel_options = ChannelOptions {
        prefix: messages.prefix(),
        existing_message: options.existing_message.clone(),
        ..Default::default()
    };
    ProgressChannel::open(sink, &options.channel, 0.0, channel_options).await
}

/// Start a CodeBuild build and follow it to completion
pub async fn run_build<C, I, Snk, S, F>(
    control: &C,
    identity: &I,
    sink: Snk,
    options: &RunOptions,
    sleep_fn: S,
) -> Result<Outcome, NotifierError>
where
    C: BuildControl + ?Sized,
    I: CallerIdentity + ?Sized,
    Snk: MessageSink,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let initiator = resolve_initiator(identity, &options.identity_mapping).await;

    let build = control.start_build(&options.project).await?;
    info!("Started build {} ({})", build.id, build.build_status);

    let messages = Messages::for_build(&options.project, &options.region, &build.id, initiator);
    let settings = TrackerSettings {
        expected_total: BUILD_PHASES.len(),
        pending_policy: JobKind::Build.pending_policy(),
    };
    let mut tracker = PhaseTracker::with_phases(settings, BUILD_PHASES);

    let mut channel = open_channel(sink, options, &messages).await?;
    channel.set_percentage(tracker.percentage()).await?;
    channel.log(&messages.started(&build.build_status)).await?;

    let source = BuildSource::new(control, &build.id);
    let outcome = poller::run(
        &options.poller,
        &source,
        &mut tracker,
        &mut channel,
        &messages,
        &build.build_status,
        sleep_fn,
    )
    .await?;

    channel.reply_in_thread(&messages.summary(&outcome.status)).await?;
    Ok(outcome)
}

/// Create (or pick up) a CodeDeploy deployment and follow it to completion
pub async fn run_deploy<C, I, Snk, S, F>(
    control: &C,
    identity: &I,
    sink: Snk,
    options: &RunOptions,
    deploy: &DeployOptions,
    sleep_fn: S,
) -> Result<Outcome, NotifierError>
where
    C: DeployControl + ?Sized,
    I: CallerIdentity + ?Sized,
    Snk: MessageSink,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let initiator = resolve_initiator(identity, &options.identity_mapping).await;

    let deployment_id = match &deploy.target {
        DeploymentTarget::Existing(id) => id.clone(),
        DeploymentTarget::Create {
            commit,
            repository_owner,
            deployment_config_name,
        } => {
            let commit_id = match commit {
                CommitSource::Commit(id) => id.clone(),
                CommitSource::BranchHead { repo_url, branch } => {
                    resolve_branch_head(repo_url, branch).await?
                }
            };
            info!("Creating deployment for commit {}...", commit_id);
            let request = CreateDeployment {
                application_name: options.project.clone(),
                deployment_group_name: deploy.deployment_group.clone(),
                deployment_config_name: deployment_config_name.clone(),
                description: format!("Initiated by deploy-notifier - by {}", initiator.user),
                repository: format!("{}/{}", repository_owner, options.project),
                commit_id,
            };
            control.create_deployment(&request).await?
        }
    };
    info!("Following deployment {}", deployment_id);

    let status = control.get_deployment_status(&deployment_id).await?;
    let source = DeploySource::new(control, &deployment_id);
    let seed = seed_targets(&source, &status, &options.poller, &sleep_fn).await?;

    let settings = TrackerSettings {
        expected_total: deploy.expected_phases,
        pending_policy: JobKind::Deploy.pending_policy(),
    };
    let mut tracker = PhaseTracker::new(settings);
    for target in &seed.targets {
        tracker.ensure_target(Some(target));
    }
    tracker.discover(&seed.phases);

    let messages = Messages::for_deploy(
        &options.project,
        &deploy.deployment_group,
        &options.region,
        &deployment_id,
        initiator,
    );

    let mut channel = open_channel(sink, options, &messages).await?;
    channel.set_percentage(tracker.percentage()).await?;
    channel.log(&messages.started(&status)).await?;

    let outcome = poller::run(
        &options.poller,
        &source,
        &mut tracker,
        &mut channel,
        &messages,
        &status,
        &sleep_fn,
    )
    .await?;

    channel.reply_in_thread(&messages.summary(&outcome.status)).await?;
    Ok(outcome)
}

/// First look at the deployment's instances; a deployment that is still
/// being set up has none to list yet, so keep asking at the poll interval.
async fn seed_targets<C, S, F>(
    source: &DeploySource<'_, C>,
    status: &str,
    options: &poller::Options,
    sleep_fn: &S,
) -> Result<JobSnapshot, NotifierError>
where
    C: DeployControl + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    loop {
        match source.targets_snapshot(status.to_string()).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) if e.is_transient() => {
                warn!("Deployment not ready ({}), retrying in {:?}", e, options.interval);
                sleep_fn(options.interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}
