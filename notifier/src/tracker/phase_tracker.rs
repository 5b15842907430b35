//! Phase tracker state machine
//!
//! Each phase key goes `Unseen -> unreported -> Reported`, with no way back
//! out of `Reported`. Every poll the tracker walks each target's ledger in
//! discovery order and reports the finished phases it reaches, stopping at
//! the first phase it cannot account for yet so reports stay in order.

use tracing::debug;

use crate::tracker::ledger::PhaseLedger;
use crate::tracker::snapshot::{is_in_flight, PhaseObservation};

/// What to do with a phase that is still `Pending` / `InProgress`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPolicy {
    /// Stop walking this target until the phase finishes
    Halt,
    /// Leave it unreported and look at the next phase
    Skip,
}

/// Tracker settings
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Number of phases that make up 100%.
    ///
    /// Fixed for the whole run; phases discovered beyond it push the
    /// running total to the 100 cap early instead of rebalancing.
    pub expected_total: usize,

    /// Handling of unfinished phases
    pub pending_policy: PendingPolicy,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            expected_total: 8,
            pending_policy: PendingPolicy::Halt,
        }
    }
}

/// A phase the tracker decided to report
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub target: Option<String>,
    pub key: String,
    pub status: String,
    pub context: Option<String>,
    pub label: Option<String>,
    /// Running percentage after this report
    pub percentage: f64,
}

/// Per-run tracker state: one ledger per target plus the running percentage
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    settings: TrackerSettings,
    ledgers: Vec<(Option<String>, PhaseLedger)>,
    percentage: f64,
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl PhaseTracker {
    /// Create an empty tracker; ledgers are created as targets are observed
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            settings,
            ledgers: Vec::new(),
            percentage: 0.0,
        }
    }

    /// Create a tracker whose single-target ledger starts from a known phase list
    pub fn with_phases<I, K>(settings: TrackerSettings, phases: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut tracker = Self::new(settings);
        tracker.ledgers.push((None, PhaseLedger::from_keys(phases)));
        tracker
    }

    /// Running percentage, 0 to 100
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Ledger of `target` (`None` for single-target jobs)
    pub fn ledger(&self, target: Option<&str>) -> Option<&PhaseLedger> {
        self.ledgers
            .iter()
            .find(|(t, _)| t.as_deref() == target)
            .map(|(_, ledger)| ledger)
    }

    /// Known targets in discovery order
    pub fn is_reported(&self, target: Option<&str>, key: &str) -> bool {
        self.ledger(target).is_some_and(|l| l.is_reported(key))
    }

    /// Make sure `target` has a ledger, even before any of its phases are seen
    pub fn ensure_target(&mut self, target: Option<&str>) {
        self.ledger_mut(target);
    }

    /// Record every observed key not seen before, in observation order
    pub fn discover(&mut self, observations: &[PhaseObservation]) {
        for obs in observations {
            let ledger = self.ledger_mut(obs.target.as_deref());
            if ledger.insert(obs.key.as_str()) {
                debug!("Discovered phase {} ({:?})", obs.key, obs.target);
            }
        }
    }

    /// Process one poll's observations and return the newly reportable phases
    pub fn observe(&mut self, observations: &[PhaseObservation]) -> Vec<PhaseReport> {
        self.discover(observations);

        let mut reports = Vec::new();
        let increment = 100.0 / self.settings.expected_total.max(1) as f64;

        for idx in 0..self.ledgers.len() {
            let target = self.ledgers[idx].0.clone();

            for key in self.ledgers[idx].1.unreported() {
                let Some(obs) = observations
                    .iter()
                    .find(|o| o.target == target && o.key == key)
                else {
                    debug!("Phase {} not found yet for {:?}", key, target);
                    break;
                };

                let Some(status) = obs.status() else {
                    debug!("Phase {} has no status yet for {:?}", key, target);
                    break;
                };

                if is_in_flight(status) {
                    match self.settings.pending_policy {
                        PendingPolicy::Halt => {
                            debug!("Phase {} is {}, waiting", key, status);
                            break;
                        }
                        PendingPolicy::Skip => {
                            debug!("Skipping phase {} with status {}", key, status);
                            continue;
                        }
                    }
                }

                self.ledgers[idx].1.mark_reported(&key);
                self.percentage = round_to_tenth(self.percentage + increment).min(100.0);

                reports.push(PhaseReport {
                    target: target.clone(),
                    key,
                    status: status.to_string(),
                    context: obs.context.clone(),
                    label: obs.label.clone(),
                    percentage: self.percentage,
                });
            }
        }

        reports
    }

    /// Terminal status reached: the bar is full regardless of what was reported
    pub fn finish(&mut self) -> f64 {
        self.percentage = 100.0;
        self.percentage
    }

    fn ledger_mut(&mut self, target: Option<&str>) -> &mut PhaseLedger {
        let idx = match self.ledgers.iter().position(|(t, _)| t.as_deref() == target) {
            Some(idx) => idx,
            None => {
                self.ledgers
                    .push((target.map(str::to_string), PhaseLedger::new()));
                self.ledgers.len() - 1
            }
        };
        &mut self.ledgers[idx].1
    }
}
