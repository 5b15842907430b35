//! Control API models, shaped like the AWS CLI JSON output

use serde::{Deserialize, Serialize};

use crate::tracker::snapshot::PhaseObservation;
use crate::utils::short_resource_id;

/// A CodeBuild build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub id: String,
    pub build_status: String,
    #[serde(default)]
    pub phases: Vec<BuildPhase>,
}

/// One CodeBuild phase; `phaseStatus` is absent until the phase ends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPhase {
    pub phase_type: String,
    #[serde(default)]
    pub phase_status: Option<String>,
    #[serde(default)]
    pub contexts: Vec<PhaseContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseContext {
    #[serde(default)]
    pub message: Option<String>,
}

impl BuildInfo {
    /// Phase observations for the single build target
    pub fn observations(&self) -> Vec<PhaseObservation> {
        self.phases
            .iter()
            .map(|phase| PhaseObservation {
                key: phase.phase_type.clone(),
                status: phase.phase_status.clone(),
                context: phase
                    .contexts
                    .iter()
                    .filter_map(|c| c.message.as_deref())
                    .find(|m| !m.is_empty())
                    .map(str::to_string),
                target: None,
                label: None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartBuildOutput {
    pub build: BuildInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchGetBuildsOutput {
    #[serde(default)]
    pub builds: Vec<BuildInfo>,
}

/// Parameters for a GitHub-revision CodeDeploy deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDeployment {
    pub application_name: String,
    pub deployment_group_name: String,
    pub deployment_config_name: String,
    pub description: String,
    /// `owner/repo`
    pub repository: String,
    pub commit_id: String,
}

impl CreateDeployment {
    /// Revision document passed as `--revision`
    pub fn revision_json(&self) -> serde_json::Value {
        serde_json::json!({
            "revisionType": "GitHub",
            "gitHubLocation": {
                "repository": self.repository,
                "commitId": self.commit_id,
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentOutput {
    pub deployment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDeploymentOutput {
    pub deployment_info: DeploymentInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDeploymentInstancesOutput {
    #[serde(default)]
    pub instances_list: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetDeploymentInstancesOutput {
    #[serde(default)]
    pub instances_summary: Vec<InstanceSummary>,
}

/// Per-instance deployment state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSummary {
    pub instance_id: String,
    /// `Blue` or `Green` for blue/green deployments
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub lifecycle_events: Vec<LifecycleEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub lifecycle_event_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub diagnostics: Option<Diagnostics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    #[serde(default)]
    pub message: Option<String>,
}

impl InstanceSummary {
    /// Instance id without the ARN prefix
    pub fn short_id(&self) -> &str {
        short_resource_id(&self.instance_id)
    }

    /// Lifecycle events as observations owned by this instance
    pub fn observations(&self) -> Vec<PhaseObservation> {
        let target = self.short_id().to_string();
        self.lifecycle_events
            .iter()
            .map(|event| PhaseObservation {
                key: event.lifecycle_event_name.clone(),
                status: event.status.clone(),
                context: event
                    .diagnostics
                    .as_ref()
                    .and_then(|d| d.message.clone())
                    .filter(|m| !m.is_empty()),
                target: Some(target.clone()),
                label: self.instance_type.clone(),
            })
            .collect()
    }
}

/// `sts get-caller-identity` output
#[derive(Debug, Clone, Deserialize)]
pub struct CallerIdentityOutput {
    #[serde(rename = "Arn")]
    pub arn: String,
}
