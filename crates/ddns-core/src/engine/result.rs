//! Run outcome types
//!
//! A run always ends in exactly one [`ReconcileResult`]. It carries the
//! aggregate status, the plan that was built, and one diagnostic per
//! host/record decision so the caller can explain what happened.

use crate::address::TargetAddresses;
use crate::plan::UpdatePlanEntry;
use crate::traits::RecordType;
use crate::zone::HostRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStatus {
    /// Every plan entry was applied (or skipped as unchanged)
    Succeeded,
    /// An update failed; earlier updates stay applied
    PartiallyFailed,
    /// The provider rejected the credentials
    AuthFailure,
    /// Malformed host list, or nothing to update
    BadParameter,
    /// A candidate address was malformed or not public, or none was given
    InvalidAddress,
    /// The provider failed a zone listing or record lookup
    ProviderError,
}

impl ReconcileStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ReconcileStatus::Succeeded)
    }
}

/// Reconciler state machine
///
/// `Start → ZonesResolved → RecordsLocated → PlanBuilt → Updating`, then
/// one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePhase {
    Start,
    ZonesResolved,
    RecordsLocated,
    PlanBuilt,
    Updating,
    Succeeded,
    PartiallyFailed,
    Aborted,
}

impl ReconcilePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReconcilePhase::Succeeded | ReconcilePhase::PartiallyFailed | ReconcilePhase::Aborted
        )
    }
}

/// Consistency guarantee across the records of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum AtomicityLevel {
    /// Each record is updated on its own; the first failure stops the run
    /// and nothing already applied is rolled back
    PerHostIndependent,
}

/// What happened to one host (and record type, once known)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HostOutcome {
    /// Not a usable host name; excluded
    InvalidHostname,
    /// No provider zone owns the host; excluded
    ZoneNotFound,
    /// The zone has no record of this type for the host; excluded
    RecordNotFound,
    /// Several records matched and the selection strategy refused them
    AmbiguousRecord { matches: usize },
    /// PATCH succeeded
    Updated { record_id: String },
    /// Record already held the target and `skip_unchanged` is on
    Unchanged { record_id: String },
    /// PATCH failed; the run stopped here
    UpdateFailed { record_id: String, error: String },
    /// Planned, but the run stopped before reaching it
    NotAttempted { record_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDiagnostic {
    pub host: String,
    pub record_type: Option<RecordType>,
    #[serde(flatten)]
    pub outcome: HostOutcome,
}

/// Terminal value of a run
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResult {
    pub status: ReconcileStatus,
    /// Terminal state
    pub phase: ReconcilePhase,
    /// Last non-terminal state reached
    pub last_phase: ReconcilePhase,
    pub targets: TargetAddresses,
    pub hosts: Vec<HostRequest>,
    pub plan: Vec<UpdatePlanEntry>,
    /// Number of successful PATCH calls
    pub applied: usize,
    pub diagnostics: Vec<HostDiagnostic>,
    /// Public-IP discovery failure, when the run continued without it
    pub discovery_error: Option<String>,
    /// Reason for a failed run
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    /// Set once a terminal phase is reached
    pub finished_at: Option<DateTime<Utc>>,
}

impl ReconcileResult {
    pub(crate) fn new() -> Self {
        Self {
            status: ReconcileStatus::BadParameter,
            phase: ReconcilePhase::Start,
            last_phase: ReconcilePhase::Start,
            targets: TargetAddresses::default(),
            hosts: Vec::new(),
            plan: Vec::new(),
            applied: 0,
            diagnostics: Vec::new(),
            discovery_error: None,
            message: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Diagnostics for one host, in the order they were recorded
    pub fn diagnostics_for<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a HostDiagnostic> {
        self.diagnostics.iter().filter(move |d| d.host == host)
    }

    pub(crate) fn enter(&mut self, phase: ReconcilePhase) {
        self.phase = phase;
        self.last_phase = phase;
    }

    pub(crate) fn note(
        &mut self,
        host: impl Into<String>,
        record_type: Option<RecordType>,
        outcome: HostOutcome,
    ) {
        self.diagnostics.push(HostDiagnostic {
            host: host.into(),
            record_type,
            outcome,
        });
    }

    pub(crate) fn finish(&mut self, status: ReconcileStatus, message: Option<String>) {
        self.status = status;
        self.message = message;
        self.phase = match status {
            ReconcileStatus::Succeeded => ReconcilePhase::Succeeded,
            ReconcileStatus::PartiallyFailed => ReconcilePhase::PartiallyFailed,
            _ => ReconcilePhase::Aborted,
        };
        self.finished_at = Some(Utc::now());
    }
}
