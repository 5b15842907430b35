//! Settings file management

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::control::aws_cli::DEFAULT_AWS_BINARY;
use crate::errors::NotifierError;
use crate::logs::LogLevel;
use crate::sink::slack::DEFAULT_BASE_URL;

/// Notifier settings, read from an optional JSON file.
///
/// Command line flags take precedence over every field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Polling interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Slack channel to post into
    #[serde(default)]
    pub channel: Option<String>,

    /// IAM user name -> Slack user id
    #[serde(default)]
    pub identity_mapping: HashMap<String, String>,

    /// Slack API configuration
    #[serde(default)]
    pub slack: SlackSettings,

    /// AWS CLI configuration
    #[serde(default)]
    pub aws: AwsSettings,

    /// Deployment defaults
    #[serde(default)]
    pub deploy: DeploySettings,
}

fn default_region() -> String {
    "eu-west-1".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            region: default_region(),
            poll_interval_secs: default_poll_interval(),
            channel: None,
            identity_mapping: HashMap::new(),
            slack: SlackSettings::default(),
            aws: AwsSettings::default(),
            deploy: DeploySettings::default(),
        }
    }
}

/// Slack API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
    /// Base URL for the Slack Web API
    #[serde(default = "default_slack_url")]
    pub base_url: String,
}

fn default_slack_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            base_url: default_slack_url(),
        }
    }
}

/// AWS CLI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsSettings {
    /// `aws` executable to run
    #[serde(default = "default_aws_binary")]
    pub binary: String,
}

fn default_aws_binary() -> String {
    DEFAULT_AWS_BINARY.to_string()
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            binary: default_aws_binary(),
        }
    }
}

/// Deployment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploySettings {
    /// GitHub owner of deployed repositories
    #[serde(default)]
    pub repository_owner: Option<String>,

    /// CodeDeploy deployment configuration
    #[serde(default = "default_deployment_config")]
    pub deployment_config_name: String,

    /// Lifecycle events counted as 100%
    #[serde(default = "default_expected_phases")]
    pub expected_phases: usize,
}

fn default_deployment_config() -> String {
    "CodeDeployDefault.AllAtOnce".to_string()
}

fn default_expected_phases() -> usize {
    crate::tracker::snapshot::DEFAULT_DEPLOY_PHASE_COUNT
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            repository_owner: None,
            deployment_config_name: default_deployment_config(),
            expected_phases: default_expected_phases(),
        }
    }
}

/// Read a JSON settings file
pub async fn load_settings(path: &Path) -> Result<Settings, NotifierError> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content)
        .map_err(|e| NotifierError::ConfigError(format!("Invalid settings file {}: {}", path.display(), e)))
}
