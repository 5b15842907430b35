//! Control API backed by the `aws` command line tool

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, error};

use crate::control::models::{
    BatchGetBuildsOutput, BatchGetDeploymentInstancesOutput, BuildInfo, CallerIdentityOutput,
    CreateDeployment, CreateDeploymentOutput, GetDeploymentOutput, InstanceSummary,
    ListDeploymentInstancesOutput, StartBuildOutput,
};
use crate::control::{BuildControl, CallerIdentity, DeployControl};
use crate::errors::NotifierError;

/// Default `aws` executable
pub const DEFAULT_AWS_BINARY: &str = "aws";

/// Runs `aws <service> <operation> ... --output json` and parses the result.
///
/// Credentials come from the usual AWS environment/profile chain.
#[derive(Debug, Clone)]
pub struct AwsCli {
    binary: String,
    region: String,
}

impl AwsCli {
    pub fn new(binary: &str, region: &str) -> Self {
        Self {
            binary: binary.to_string(),
            region: region.to_string(),
        }
    }

    async fn run<T: DeserializeOwned>(&self, service: &str, args: &[&str]) -> Result<T, NotifierError> {
        debug!("{} {} {}", self.binary, service, args.join(" "));

        let output = Command::new(&self.binary)
            .arg(service)
            .args(args)
            .args(["--region", self.region.as_str(), "--output", "json"])
            .output()
            .await
            .map_err(|e| NotifierError::ControlError(format!("Failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("{} {} failed: {}", service, args.first().unwrap_or(&""), stderr);
            return Err(NotifierError::ControlError(format!(
                "{} {}: {}",
                service,
                args.first().unwrap_or(&""),
                stderr
            )));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl BuildControl for AwsCli {
    async fn start_build(&self, project: &str) -> Result<BuildInfo, NotifierError> {
        let output: StartBuildOutput = self
            .run("codebuild", &["start-build", "--project-name", project])
            .await?;
        Ok(output.build)
    }

    async fn get_build(&self, build_id: &str) -> Result<BuildInfo, NotifierError> {
        let output: BatchGetBuildsOutput = self
            .run("codebuild", &["batch-get-builds", "--ids", build_id])
            .await?;
        output
            .builds
            .into_iter()
            .next()
            .ok_or_else(|| NotifierError::ControlError(format!("Build {} not found", build_id)))
    }
}

#[async_trait]
impl DeployControl for AwsCli {
    async fn create_deployment(&self, request: &CreateDeployment) -> Result<String, NotifierError> {
        let revision = request.revision_json().to_string();
        let output: CreateDeploymentOutput = self
            .run(
                "deploy",
                &[
                    "create-deployment",
                    "--application-name",
                    request.application_name.as_str(),
                    "--deployment-group-name",
                    request.deployment_group_name.as_str(),
                    "--deployment-config-name",
                    request.deployment_config_name.as_str(),
                    "--description",
                    request.description.as_str(),
                    "--revision",
                    revision.as_str(),
                    "--file-exists-behavior",
                    "OVERWRITE",
                ],
            )
            .await?;
        Ok(output.deployment_id)
    }

    async fn get_deployment_status(&self, deployment_id: &str) -> Result<String, NotifierError> {
        let output: GetDeploymentOutput = self
            .run("deploy", &["get-deployment", "--deployment-id", deployment_id])
            .await?;
        Ok(output.deployment_info.status)
    }

    async fn list_targets(&self, deployment_id: &str) -> Result<Vec<String>, NotifierError> {
        let output: ListDeploymentInstancesOutput = self
            .run("deploy", &["list-deployment-instances", "--deployment-id", deployment_id])
            .await
            .map_err(|e| NotifierError::TargetsUnavailable(e.to_string()))?;
        Ok(output.instances_list)
    }

    async fn batch_get_targets(
        &self,
        deployment_id: &str,
        target_ids: &[String],
    ) -> Result<Vec<InstanceSummary>, NotifierError> {
        if target_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = vec![
            "batch-get-deployment-instances",
            "--deployment-id",
            deployment_id,
            "--instance-ids",
        ];
        args.extend(target_ids.iter().map(String::as_str));

        let output: BatchGetDeploymentInstancesOutput = self.run("deploy", &args).await?;
        Ok(output.instances_summary)
    }
}

#[async_trait]
impl CallerIdentity for AwsCli {
    async fn caller_arn(&self) -> Result<String, NotifierError> {
        let output: CallerIdentityOutput = self.run("sts", &["get-caller-identity"]).await?;
        Ok(output.arn)
    }
}
