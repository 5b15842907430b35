//! Job snapshots as seen by the tracker

use serde::{Deserialize, Serialize};

use crate::tracker::phase_tracker::PendingPolicy;

/// CodeBuild phases in execution order
pub const BUILD_PHASES: [&str; 8] = [
    "SUBMITTED",
    "QUEUED",
    "PROVISIONING",
    "DOWNLOAD_SOURCE",
    "INSTALL",
    "PRE_BUILD",
    "BUILD",
    "POST_BUILD",
];

/// Lifecycle events a CodeDeploy in-place deployment is expected to report
pub const DEFAULT_DEPLOY_PHASE_COUNT: usize = 13;

/// One phase or lifecycle event as reported by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseObservation {
    /// Phase name, e.g. `BUILD` or `ApplicationStart`
    pub key: String,

    /// Phase status; absent while the source has not assigned one
    pub status: Option<String>,

    /// Extra detail from the source, e.g. a failure diagnostic
    pub context: Option<String>,

    /// Owning target (instance id); `None` for single-target jobs
    pub target: Option<String>,

    /// Target label, e.g. `Blue` / `Green`
    pub label: Option<String>,
}

impl PhaseObservation {
    /// Single-target observation
    pub fn new(key: &str, status: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            status: status.map(str::to_string),
            context: None,
            target: None,
            label: None,
        }
    }

    /// Observation owned by `target`
    pub fn for_target(target: &str, key: &str, status: Option<&str>) -> Self {
        Self {
            target: Some(target.to_string()),
            ..Self::new(key, status)
        }
    }

    /// Status, treating an empty string as unset
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Whether a status means the phase has not finished yet.
///
/// Matches `Pending`, `InProgress` and CodeBuild's `IN_PROGRESS`.
pub fn is_in_flight(status: &str) -> bool {
    let normalized: String = status
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    matches!(normalized.as_str(), "pending" | "inprogress")
}

/// State of the whole job at one poll
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSnapshot {
    pub status: String,
    pub phases: Vec<PhaseObservation>,
    /// Every target the source listed, including ones with no events yet
    pub targets: Vec<String>,
}

/// The kind of job being tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// CodeBuild build
    Build,
    /// CodeDeploy deployment
    Deploy,
}

impl JobKind {
    /// Whether the overall status means the job will not progress further
    pub fn is_terminal(&self, status: &str) -> bool {
        match self {
            JobKind::Build => status != "IN_PROGRESS",
            JobKind::Deploy => matches!(status, "Succeeded" | "Failed" | "Stopped"),
        }
    }

    /// Whether a terminal status is a success
    pub fn is_success(&self, status: &str) -> bool {
        match self {
            JobKind::Build => status == "SUCCEEDED",
            JobKind::Deploy => status == "Succeeded",
        }
    }

    /// How the tracker treats a phase that is still running.
    ///
    /// Builds stop at the first unfinished phase; deployments skip past it to
    /// later events of the same instance.
    pub fn pending_policy(&self) -> PendingPolicy {
        match self {
            JobKind::Build => PendingPolicy::Halt,
            JobKind::Deploy => PendingPolicy::Skip,
        }
    }

    /// Human name used in messages
    pub fn noun(&self) -> &'static str {
        match self {
            JobKind::Build => "Build",
            JobKind::Deploy => "Deploy",
        }
    }
}
