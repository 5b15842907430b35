//! Phase tracking: which remote phases have been reported, and how far along the run is

pub mod ledger;
pub mod phase_tracker;
pub mod snapshot;

pub use ledger::PhaseLedger;
pub use phase_tracker::{PendingPolicy, PhaseReport, PhaseTracker, TrackerSettings};
pub use snapshot::{JobKind, JobSnapshot, PhaseObservation};
