//! Run options resolved from the command line and the settings file

use std::time::Duration;

use crate::app::cli::{CommonArgs, DeployArgs};
use crate::app::settings::Settings;
use crate::errors::NotifierError;
use crate::identity::IdentityMapping;
use crate::sink::permalink::{is_channel_id, parse_message_ref, ExistingMessage};
use crate::workers::poller;

/// Options shared by build and deploy runs
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Slack channel to post into
    pub channel: String,

    /// CodeBuild project / CodeDeploy application
    pub project: String,

    /// AWS region
    pub region: String,

    /// IAM user -> Slack user id
    pub identity_mapping: IdentityMapping,

    /// Keep editing this message instead of posting a new one
    pub existing_message: Option<ExistingMessage>,

    /// Poller options
    pub poller: poller::Options,
}

impl RunOptions {
    /// Merge flags over settings; fails on anything malformed before a message is posted
    pub fn resolve(args: &CommonArgs, settings: &Settings) -> Result<Self, NotifierError> {
        let channel = args
            .channel
            .clone()
            .or_else(|| settings.channel.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| NotifierError::ConfigError("A Slack channel is required".to_string()))?;

        if args.project.trim().is_empty() {
            return Err(NotifierError::ConfigError("A project name is required".to_string()));
        }

        let mut identity_mapping = IdentityMapping::new(settings.identity_mapping.clone());
        if let Some(raw) = &args.identity_mapping {
            identity_mapping = identity_mapping.merged(raw.parse()?);
        }

        let existing_message = args
            .slack_link
            .as_deref()
            .filter(|link| !link.trim().is_empty())
            .map(parse_message_ref)
            .transpose()?;

        // chat.update only accepts a channel id
        if let Some(ExistingMessage { channel_id: None, .. }) = &existing_message {
            if !is_channel_id(&channel) {
                return Err(NotifierError::ConfigError(format!(
                    "A bare message timestamp needs --channel to be a channel id, not {}; pass the message permalink instead",
                    channel
                )));
            }
        }

        let interval_secs = args.poll_interval_secs.unwrap_or(settings.poll_interval_secs);
        if interval_secs == 0 {
            return Err(NotifierError::ConfigError(
                "Poll interval must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            channel,
            project: args.project.clone(),
            region: args.region.clone().unwrap_or_else(|| settings.region.clone()),
            identity_mapping,
            existing_message,
            poller: poller::Options {
                interval: Duration::from_secs(interval_secs),
            },
        })
    }
}

/// Which commit a new deployment should ship
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSource {
    /// Explicit commit id
    Commit(String),

    /// Head of a branch on a remote
    BranchHead { repo_url: String, branch: String },
}

/// What to do about the deployment itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentTarget {
    /// Follow a deployment that already exists
    Existing(String),

    /// Create a new deployment
    Create {
        commit: CommitSource,
        repository_owner: String,
        deployment_config_name: String,
    },
}

/// Deploy-only options
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// CodeDeploy deployment group
    pub deployment_group: String,

    /// Existing or new deployment
    pub target: DeploymentTarget,

    /// Lifecycle events counted as 100%
    pub expected_phases: usize,
}

impl DeployOptions {
    pub fn resolve(args: &DeployArgs, settings: &Settings) -> Result<Self, NotifierError> {
        let expected_phases = args
            .expected_phases
            .unwrap_or(settings.deploy.expected_phases);
        if expected_phases == 0 {
            return Err(NotifierError::ConfigError(
                "Expected phase count must be positive".to_string(),
            ));
        }

        let target = match args.deployment_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => DeploymentTarget::Existing(id.to_string()),
            None => {
                let commit = match (&args.commit_id, &args.git_repo_url, &args.git_branch) {
                    (Some(commit), _, _) if !commit.is_empty() => CommitSource::Commit(commit.clone()),
                    (_, Some(repo_url), Some(branch)) => CommitSource::BranchHead {
                        repo_url: repo_url.clone(),
                        branch: branch.clone(),
                    },
                    _ => {
                        return Err(NotifierError::ConfigError(
                            "Creating a deployment needs --commit-id or --git-repo-url with --git-branch"
                                .to_string(),
                        ))
                    }
                };
                let repository_owner = args
                    .repository_owner
                    .clone()
                    .or_else(|| settings.deploy.repository_owner.clone())
                    .ok_or_else(|| {
                        NotifierError::ConfigError(
                            "Creating a deployment needs --repository-owner".to_string(),
                        )
                    })?;
                DeploymentTarget::Create {
                    commit,
                    repository_owner,
                    deployment_config_name: settings.deploy.deployment_config_name.clone(),
                }
            }
        };

        Ok(Self {
            deployment_group: args.deployment_group.clone(),
            target,
            expected_phases,
        })
    }
}
