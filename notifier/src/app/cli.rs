//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "deploy-notifier")]
#[command(about = "Streams AWS CodeBuild / CodeDeploy progress into a single Slack message")]
pub struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a CodeBuild build and follow it
    Build(BuildArgs),

    /// Create (or observe) a CodeDeploy deployment and follow it
    Deploy(DeployArgs),

    /// Print version information as JSON
    Version,
}

/// Flags shared by every run
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Slack bot token
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true, alias = "slack_token")]
    pub slack_token: Option<String>,

    /// Slack channel name or id
    #[arg(long, alias = "channel-name", alias = "channel_name")]
    pub channel: Option<String>,

    /// CodeBuild project / CodeDeploy application
    #[arg(long, alias = "project-name", alias = "project_name")]
    pub project: String,

    /// AWS region
    #[arg(long, alias = "aws-region", alias = "aws_region")]
    pub region: Option<String>,

    /// JSON object mapping IAM user names to Slack user ids
    #[arg(
        long,
        alias = "iam-slack-usernames-mapping",
        alias = "iam_slack_usernames_mapping"
    )]
    pub identity_mapping: Option<String>,

    /// Existing message to keep updating instead of posting a new one: its
    /// permalink, or a bare `ts` when `--channel` is a channel id
    #[arg(long, alias = "slack_link")]
    pub slack_link: Option<String>,

    /// Seconds between status polls
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,

    /// Print every message write to stdout instead of calling Slack
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// CodeDeploy deployment group
    #[arg(long, alias = "deployment_group_name", alias = "deployment-group-name")]
    pub deployment_group: String,

    /// Follow this existing deployment instead of creating one
    #[arg(long, alias = "deployment_id")]
    pub deployment_id: Option<String>,

    /// Commit to deploy
    #[arg(long, alias = "commit_id", conflicts_with = "git_branch")]
    pub commit_id: Option<String>,

    /// Remote to resolve `--git-branch` against
    #[arg(long, alias = "ssh_git_repo_url", alias = "ssh-git-repo-url", requires = "git_branch")]
    pub git_repo_url: Option<String>,

    /// Branch whose head commit is deployed
    #[arg(long, alias = "git_repo_branch", alias = "git-repo-branch", requires = "git_repo_url")]
    pub git_branch: Option<String>,

    /// GitHub owner of the repository named after the project
    #[arg(long, alias = "repository_name", alias = "repository-name")]
    pub repository_owner: Option<String>,

    /// Lifecycle events counted as 100%
    #[arg(long)]
    pub expected_phases: Option<usize>,
}
