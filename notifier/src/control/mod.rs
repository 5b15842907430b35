//! Build/deploy control API
//!
//! The tracker only needs snapshots; these traits describe what the poll
//! driver and the run setup ask of AWS.

pub mod aws_cli;
pub mod models;

use async_trait::async_trait;

use crate::errors::NotifierError;
use crate::control::models::{BuildInfo, CreateDeployment, InstanceSummary};

pub use aws_cli::AwsCli;

/// CodeBuild operations
#[async_trait]
pub trait BuildControl: Send + Sync {
    /// Start a build of `project`
    async fn start_build(&self, project: &str) -> Result<BuildInfo, NotifierError>;

    /// Fetch the current state of a build
    async fn get_build(&self, build_id: &str) -> Result<BuildInfo, NotifierError>;
}

/// CodeDeploy operations
#[async_trait]
pub trait DeployControl: Send + Sync {
    /// Create a deployment, returning its id
    async fn create_deployment(&self, request: &CreateDeployment) -> Result<String, NotifierError>;

    /// Overall deployment status, e.g. `InProgress` or `Succeeded`
    async fn get_deployment_status(&self, deployment_id: &str) -> Result<String, NotifierError>;

    /// Target (instance) ids of a deployment.
    ///
    /// Fails with `TargetsUnavailable` while the deployment is still being set up.
    async fn list_targets(&self, deployment_id: &str) -> Result<Vec<String>, NotifierError>;

    /// Lifecycle events for each target
    async fn batch_get_targets(
        &self,
        deployment_id: &str,
        target_ids: &[String],
    ) -> Result<Vec<InstanceSummary>, NotifierError>;
}

/// Who is running the notifier
#[async_trait]
pub trait CallerIdentity: Send + Sync {
    /// ARN of the calling principal
    async fn caller_arn(&self) -> Result<String, NotifierError>;
}
