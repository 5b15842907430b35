//! Scripted stand-ins for the AWS control APIs and a recording Slack sink

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use deploy_notifier::app::options::RunOptions;
use deploy_notifier::control::models::{
    BuildInfo, BuildPhase, CreateDeployment, InstanceSummary, LifecycleEvent,
};
use deploy_notifier::control::{BuildControl, CallerIdentity, DeployControl};
use deploy_notifier::errors::NotifierError;
use deploy_notifier::sink::{MessageRef, MessageSink};
use deploy_notifier::workers::poller;

pub const BUILD_ID: &str = "web:0f1e2d3c";

pub fn run_options() -> RunOptions {
    RunOptions {
        channel: "deploys".to_string(),
        project: "web".to_string(),
        region: "eu-west-1".to_string(),
        identity_mapping: r#"{"jane": "U012AB3CD"}"#.parse().unwrap(),
        existing_message: None,
        poller: poller::Options {
            interval: Duration::from_secs(5),
        },
    }
}

pub fn build(status: &str, phases: &[(&str, Option<&str>)]) -> BuildInfo {
    BuildInfo {
        id: BUILD_ID.to_string(),
        build_status: status.to_string(),
        phases: phases
            .iter()
            .map(|(phase_type, phase_status)| BuildPhase {
                phase_type: phase_type.to_string(),
                phase_status: phase_status.map(str::to_string),
                contexts: Vec::new(),
            })
            .collect(),
    }
}

pub fn instance(id: &str, instance_type: Option<&str>, events: &[(&str, &str)]) -> InstanceSummary {
    InstanceSummary {
        instance_id: id.to_string(),
        instance_type: instance_type.map(str::to_string),
        lifecycle_events: events
            .iter()
            .map(|(name, status)| LifecycleEvent {
                lifecycle_event_name: name.to_string(),
                status: Some(status.to_string()),
                diagnostics: None,
            })
            .collect(),
    }
}

/// Caller identity that either answers with a fixed ARN or fails
pub struct FakeIdentity(pub Option<String>);

impl FakeIdentity {
    pub fn user(name: &str) -> Self {
        Self(Some(format!("arn:aws:iam::123456789012:user/{}", name)))
    }
}

#[async_trait]
impl CallerIdentity for FakeIdentity {
    async fn caller_arn(&self) -> Result<String, NotifierError> {
        self.0
            .clone()
            .ok_or_else(|| NotifierError::ControlError("sts unreachable".to_string()))
    }
}

/// CodeBuild that replays one scripted response per `get_build`
pub struct FakeBuild {
    started: BuildInfo,
    polls: Mutex<VecDeque<Result<BuildInfo, NotifierError>>>,
    pub started_projects: Mutex<Vec<String>>,
}

impl FakeBuild {
    pub fn new(started: BuildInfo, polls: Vec<Result<BuildInfo, NotifierError>>) -> Self {
        Self {
            started,
            polls: Mutex::new(polls.into()),
            started_projects: Mutex::new(Vec::new()),
        }
    }

    pub fn remaining_polls(&self) -> usize {
        self.polls.lock().unwrap().len()
    }
}

#[async_trait]
impl BuildControl for FakeBuild {
    async fn start_build(&self, project: &str) -> Result<BuildInfo, NotifierError> {
        self.started_projects.lock().unwrap().push(project.to_string());
        Ok(self.started.clone())
    }

    async fn get_build(&self, build_id: &str) -> Result<BuildInfo, NotifierError> {
        assert_eq!(build_id, BUILD_ID);
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(NotifierError::ControlError("script exhausted".to_string())))
    }
}

/// CodeDeploy with separately scripted statuses, listings and instance batches
pub struct FakeDeploy {
    statuses: Mutex<VecDeque<String>>,
    listings: Mutex<VecDeque<Result<Vec<String>, NotifierError>>>,
    batches: Mutex<VecDeque<Vec<InstanceSummary>>>,
    pub created: Mutex<Vec<CreateDeployment>>,
    pub status_calls: Mutex<Vec<String>>,
}

impl FakeDeploy {
    pub fn new(
        statuses: &[&str],
        listings: Vec<Result<Vec<String>, NotifierError>>,
        batches: Vec<Vec<InstanceSummary>>,
    ) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().map(|s| s.to_string()).collect()),
            listings: Mutex::new(listings.into()),
            batches: Mutex::new(batches.into()),
            created: Mutex::new(Vec::new()),
            status_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeployControl for FakeDeploy {
    async fn create_deployment(&self, request: &CreateDeployment) -> Result<String, NotifierError> {
        self.created.lock().unwrap().push(request.clone());
        Ok("d-CREATED01".to_string())
    }

    async fn get_deployment_status(&self, deployment_id: &str) -> Result<String, NotifierError> {
        self.status_calls.lock().unwrap().push(deployment_id.to_string());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| NotifierError::ControlError("script exhausted".to_string()))
    }

    async fn list_targets(&self, _deployment_id: &str) -> Result<Vec<String>, NotifierError> {
        let mut listings = self.listings.lock().unwrap();
        match listings.pop_front() {
            Some(listing) => listing,
            None => Err(NotifierError::ControlError("script exhausted".to_string())),
        }
    }

    async fn batch_get_targets(
        &self,
        _deployment_id: &str,
        target_ids: &[String],
    ) -> Result<Vec<InstanceSummary>, NotifierError> {
        let batch = self
            .batches
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| NotifierError::ControlError("script exhausted".to_string()))?;
        assert_eq!(batch.len(), target_ids.len());
        Ok(batch)
    }
}

/// One observed sink write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkWrite {
    Post { channel: String, text: String },
    Update { message: MessageRef, text: String },
    ThreadReply { message: MessageRef, text: String },
}

/// Slack stand-in that keeps every write; can be told to reject them
#[derive(Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<SinkWrite>>,
    failure: Mutex<Option<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn writes(&self) -> Vec<SinkWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Body of the message as the channel last left it
    pub fn last_text(&self) -> Option<String> {
        self.writes().into_iter().rev().find_map(|write| match write {
            SinkWrite::Post { text, .. } | SinkWrite::Update { text, .. } => Some(text),
            SinkWrite::ThreadReply { .. } => None,
        })
    }

    pub fn thread_replies(&self) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter_map(|write| match write {
                SinkWrite::ThreadReply { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, write: SinkWrite) -> Result<(), NotifierError> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(NotifierError::SlackError(reason));
        }
        self.writes.lock().unwrap().push(write);
        Ok(())
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn post_message(&self, channel: &str, text: &str) -> Result<MessageRef, NotifierError> {
        self.push(SinkWrite::Post {
            channel: channel.to_string(),
            text: text.to_string(),
        })?;
        Ok(MessageRef {
            channel_id: format!("{}-id", channel),
            ts: "1700000000.000100".to_string(),
        })
    }

    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        self.push(SinkWrite::Update {
            message: message.clone(),
            text: text.to_string(),
        })
    }

    async fn post_thread_reply(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        self.push(SinkWrite::ThreadReply {
            message: message.clone(),
            text: text.to_string(),
        })
    }
}
