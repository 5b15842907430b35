//! Slack-formatted text for each step of a run

use url::form_urlencoded::byte_serialize;

use crate::identity::Initiator;
use crate::tracker::{JobKind, PhaseReport};

const SUCCESS_MARKER: &str = ":large_blue_circle:";
const FAILURE_MARKER: &str = ":red_circle:";

/// AWS console deep links
pub mod console {
    use super::byte_serialize;

    fn base(region: &str) -> String {
        format!("https://{}.console.aws.amazon.com", region)
    }

    pub fn build(region: &str, project: &str, build_id: &str) -> String {
        let encoded: String = byte_serialize(build_id.as_bytes()).collect();
        format!(
            "{}/codesuite/codebuild/projects/{}/build/{}/?region={}",
            base(region),
            project,
            encoded,
            region
        )
    }

    pub fn deployment(region: &str, deployment_id: &str) -> String {
        format!(
            "{}/codesuite/codedeploy/deployments/{}?region={}",
            base(region),
            deployment_id,
            region
        )
    }

    pub fn instance(region: &str, instance_id: &str) -> String {
        format!(
            "{}/ec2/v2/home?region={}#Instances:instanceId={}",
            base(region),
            region,
            instance_id
        )
    }
}

/// Formats the lines a run pushes to Slack
#[derive(Debug, Clone)]
pub struct Messages {
    kind: JobKind,
    project: String,
    region: String,
    heading: String,
    initiator: Initiator,
}

impl Messages {
    pub fn for_build(project: &str, region: &str, build_id: &str, initiator: Initiator) -> Self {
        let link = console::build(region, project, build_id);
        Self {
            kind: JobKind::Build,
            project: project.to_string(),
            region: region.to_string(),
            heading: format!("<{}|*CodeBuild: {}*>", link, project),
            initiator,
        }
    }

    pub fn for_deploy(
        project: &str,
        deployment_group: &str,
        region: &str,
        deployment_id: &str,
        initiator: Initiator,
    ) -> Self {
        let link = console::deployment(region, deployment_id);
        Self {
            kind: JobKind::Deploy,
            project: project.to_string(),
            region: region.to_string(),
            heading: format!("<{}|*CodeDeploy: {} - {}*>", link, project, deployment_group),
            initiator,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Header line shown above the bar; deployments only
    pub fn prefix(&self) -> Option<String> {
        match self.kind {
            JobKind::Build => None,
            JobKind::Deploy => Some(self.heading.clone()),
        }
    }

    fn status_label(&self) -> &'static str {
        match self.kind {
            JobKind::Build => "BuildStatus",
            JobKind::Deploy => "DeploymentStatus",
        }
    }

    /// First log line of the run
    pub fn started(&self, status: &str) -> String {
        format!(
            "{}: *{}*, {}=`{}`, Initiated by: {}",
            self.kind.noun(),
            self.project,
            self.status_label(),
            status,
            self.initiator.mention
        )
    }

    /// Log line for a reported phase
    pub fn phase(&self, report: &PhaseReport) -> String {
        let mut line = match (self.kind, report.target.as_deref()) {
            (JobKind::Deploy, Some(instance_id)) => {
                let book = if report.label.as_deref() == Some("Blue") {
                    ":blue_book:"
                } else {
                    ":green_book:"
                };
                format!(
                    "Deployment's Phase: {}, [{} <{}|*{}*>] PhaseStatus=*{}*",
                    report.key,
                    book,
                    console::instance(&self.region, instance_id),
                    instance_id,
                    report.status
                )
            }
            _ => format!(
                "{}'s Phase: {}, PhaseStatus=*{}*",
                self.kind.noun(),
                report.key,
                report.status
            ),
        };
        if let Some(context) = &report.context {
            line.push_str(&format!(" - _{}_", context));
        }
        line
    }

    /// Last log line, tagged with the outcome marker
    pub fn finished(&self, status: &str) -> String {
        let marker = if self.kind.is_success(status) {
            SUCCESS_MARKER
        } else {
            FAILURE_MARKER
        };
        format!(
            "{}: *{}*, {}=`{}`{}",
            self.kind.noun(),
            self.project,
            self.status_label(),
            status,
            marker
        )
    }

    /// Thread reply posted once the run is over
    pub fn summary(&self, status: &str) -> String {
        format!("{} *{}!* {}", self.heading, status, self.initiator.mention)
    }
}
