//! Reconciliation engine
//!
//! The Reconciler drives one run end to end:
//! - Classifying the target addresses (discovered and supplied)
//! - Resolving each requested host to its owning zone
//! - Locating the existing record per host and record type
//! - Planning and applying the PATCH updates
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   text    ┌──────────────┐   zones / records / PATCH   ┌─────────────┐
//! │  IpSource   │──────────▶│  Reconciler  │◀───────────────────────────▶│ DnsProvider │
//! └─────────────┘           └──────────────┘                             └─────────────┘
//!                                  │
//!                                  ▼
//!                          ReconcileResult
//! ```
//!
//! ## Run Flow
//!
//! 1. Classify addresses; any invalid candidate aborts with `InvalidAddress`
//! 2. Parse the host list; an empty list aborts with `BadParameter`
//! 3. List zones; failure aborts (`AuthFailure` or `ProviderError`)
//! 4. Look up one record per resolved host and record type; failure aborts
//! 5. Build the plan; an empty plan aborts with `BadParameter`
//! 6. PATCH entries in order; the first failure stops the run (`PartiallyFailed`)
//!
//! Execution is strictly sequential. There are no retries and nothing is
//! kept between runs.

mod result;

pub use result::{
    AtomicityLevel, HostDiagnostic, HostOutcome, ReconcilePhase, ReconcileResult, ReconcileStatus,
};

use crate::address::{TargetAddresses, classify};
use crate::config::ReconcileConfig;
use crate::error::{Error, Result};
use crate::locator::{Located, RecordLocator};
use crate::plan::plan;
use crate::traits::{DnsProvider, IpSource};
use crate::zone::{HostRequest, is_valid_hostname, parse_host_list, resolve};
use tracing::{debug, error, info, warn};

/// Input of a single run
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Raw host list, names joined by the configured delimiter
    pub hosts: String,
    /// Caller-supplied address literals, applied after any discovered one
    pub addresses: Vec<String>,
}

impl RunRequest {
    pub fn new(hosts: impl Into<String>) -> Self {
        Self {
            hosts: hosts.into(),
            addresses: Vec::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.addresses.push(address.into());
        self
    }
}

/// Why a run stopped before the update phase
struct Abort {
    status: ReconcileStatus,
    error: Error,
}

impl Abort {
    fn new(status: ReconcileStatus, error: Error) -> Self {
        Self { status, error }
    }

    /// Provider failure before any update: credentials or systemic
    fn provider(error: Error) -> Self {
        let status = if error.is_auth() {
            ReconcileStatus::AuthFailure
        } else {
            ReconcileStatus::ProviderError
        };
        Self::new(status, error)
    }
}

/// One-shot DDNS reconciler
///
/// Owns the collaborators for a run. A `Reconciler` can be run repeatedly;
/// each call to [`Reconciler::run`] starts from scratch.
pub struct Reconciler {
    /// DNS provider transport
    provider: Box<dyn DnsProvider>,

    /// Optional public-IP discovery
    ip_source: Option<Box<dyn IpSource>>,

    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a reconciler
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(provider: Box<dyn DnsProvider>, config: ReconcileConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            ip_source: None,
            config,
        })
    }

    /// Query `source` for the public address at the start of each run
    ///
    /// A failing source is recorded in `discovery_error` and the run goes on
    /// with the supplied addresses; it never aborts the run by itself.
    pub fn with_ip_source(mut self, source: Box<dyn IpSource>) -> Self {
        self.ip_source = Some(source);
        self
    }

    /// Guarantee offered across the records of one run
    pub fn atomicity(&self) -> AtomicityLevel {
        AtomicityLevel::PerHostIndependent
    }

    /// Run one reconciliation
    ///
    /// Never fails: every error is folded into the returned status.
    pub async fn run(&self, request: &RunRequest) -> ReconcileResult {
        let mut report = ReconcileResult::new();
        info!(
            "Starting reconciliation via {} provider",
            self.provider.provider_name()
        );

        match self.reconcile(request, &mut report).await {
            Ok(status) => {
                let message = report
                    .diagnostics
                    .iter()
                    .find_map(|d| match &d.outcome {
                        HostOutcome::UpdateFailed { error, .. } => Some(error.clone()),
                        _ => None,
                    });
                report.finish(status, message);
            }
            Err(abort) => {
                error!(
                    "Reconciliation aborted ({:?}) during {:?}: {}",
                    abort.status, report.last_phase, abort.error
                );
                report.finish(abort.status, Some(abort.error.to_string()));
            }
        }

        let elapsed = report
            .finished_at
            .map(|t| (t - report.started_at).num_milliseconds())
            .unwrap_or_default();
        info!(
            "Reconciliation finished in {}ms: {:?}, {} of {} record(s) updated",
            elapsed,
            report.status,
            report.applied,
            report.plan.len()
        );
        report
    }

    async fn reconcile(
        &self,
        request: &RunRequest,
        report: &mut ReconcileResult,
    ) -> std::result::Result<ReconcileStatus, Abort> {
        report.enter(ReconcilePhase::Start);

        let targets = self.collect_targets(request, report).await?;
        report.targets = targets;
        info!(
            "Target addresses: A={} AAAA={}",
            display_target(report.targets.ipv4.as_ref()),
            display_target(report.targets.ipv6.as_ref())
        );

        let hosts = self.parse_hosts(request, report)?;

        // Start → ZonesResolved
        let zones = self.provider.list_zones().await.map_err(Abort::provider)?;
        debug!("Provider returned {} zone(s)", zones.len());

        report.hosts = resolve(&zones, &hosts, self.config.zone_match);
        report.enter(ReconcilePhase::ZonesResolved);

        // ZonesResolved → RecordsLocated
        let locator = RecordLocator::new(self.provider.as_ref(), self.config.record_selection);
        let record_types = report.targets.record_types();
        let resolved = report.hosts.clone();
        let mut located = Vec::new();

        for host in &resolved {
            let Some(zone_id) = host.zone_id.as_deref() else {
                warn!("Skipping {}: no zone owns it", host.fullname);
                report.note(&host.fullname, None, HostOutcome::ZoneNotFound);
                continue;
            };

            for record_type in &record_types {
                let outcome = locator
                    .locate(zone_id, &host.fullname, *record_type)
                    .await
                    .map_err(Abort::provider)?;

                match outcome {
                    Located::Found(record) => located.push(record),
                    Located::NotFound => {
                        warn!("Skipping {} {}: no existing record", record_type, host.fullname);
                        report.note(&host.fullname, Some(*record_type), HostOutcome::RecordNotFound);
                    }
                    Located::Ambiguous(matches) => {
                        warn!(
                            "Skipping {} {}: {} records match",
                            record_type, host.fullname, matches
                        );
                        report.note(
                            &host.fullname,
                            Some(*record_type),
                            HostOutcome::AmbiguousRecord { matches },
                        );
                    }
                }
            }
        }
        report.enter(ReconcilePhase::RecordsLocated);

        // RecordsLocated → PlanBuilt
        report.plan = plan(&located, &report.targets);
        if report.plan.is_empty() {
            return Err(Abort::new(
                ReconcileStatus::BadParameter,
                Error::bad_parameter("no existing record to update for the given hosts"),
            ));
        }
        report.enter(ReconcilePhase::PlanBuilt);
        info!("Planned {} update(s)", report.plan.len());

        Ok(self.apply(report).await)
    }

    /// Discovered address first, then the supplied ones; later wins per family
    async fn collect_targets(
        &self,
        request: &RunRequest,
        report: &mut ReconcileResult,
    ) -> std::result::Result<TargetAddresses, Abort> {
        let mut candidates = Vec::with_capacity(request.addresses.len() + 1);

        if let Some(source) = &self.ip_source {
            match source.current().await {
                Ok(text) => {
                    debug!("{} reported {}", source.source_name(), text);
                    candidates.push(text);
                }
                Err(e) => {
                    warn!(
                        "Public IP discovery via {} failed, continuing without it: {}",
                        source.source_name(),
                        e
                    );
                    report.discovery_error = Some(e.to_string());
                }
            }
        }
        candidates.extend(request.addresses.iter().cloned());

        let mut targets = TargetAddresses::default();
        for candidate in &candidates {
            let address = classify(candidate)
                .map_err(|e| Abort::new(ReconcileStatus::InvalidAddress, e))?;
            targets.insert(address);
        }

        if targets.is_empty() {
            return Err(Abort::new(
                ReconcileStatus::InvalidAddress,
                Error::invalid_address("no address to publish"),
            ));
        }

        Ok(targets)
    }

    fn parse_hosts(
        &self,
        request: &RunRequest,
        report: &mut ReconcileResult,
    ) -> std::result::Result<Vec<HostRequest>, Abort> {
        let names = parse_host_list(&request.hosts, &self.config.host_delimiter)
            .map_err(|e| Abort::new(ReconcileStatus::BadParameter, e))?;

        let mut hosts = Vec::with_capacity(names.len());
        for name in names {
            if is_valid_hostname(&name) {
                hosts.push(HostRequest::new(name));
            } else {
                warn!("Skipping '{}': not a valid host name", name);
                report.note(name, None, HostOutcome::InvalidHostname);
            }
        }
        Ok(hosts)
    }

    /// PlanBuilt → Updating → Succeeded | PartiallyFailed
    async fn apply(&self, report: &mut ReconcileResult) -> ReconcileStatus {
        report.enter(ReconcilePhase::Updating);
        let entries = report.plan.clone();

        for (index, entry) in entries.iter().enumerate() {
            if self.config.skip_unchanged && entry.is_unchanged() {
                info!(
                    "{} {} already points at {}, skipping",
                    entry.record_type, entry.name, entry.content
                );
                report.note(
                    &entry.name,
                    Some(entry.record_type),
                    HostOutcome::Unchanged {
                        record_id: entry.record_id.clone(),
                    },
                );
                continue;
            }

            match self.provider.patch_record(entry).await {
                Ok(()) => {
                    info!(
                        "Updated {} {} -> {} (was: {})",
                        entry.record_type, entry.name, entry.content, entry.previous_content
                    );
                    report.applied += 1;
                    report.note(
                        &entry.name,
                        Some(entry.record_type),
                        HostOutcome::Updated {
                            record_id: entry.record_id.clone(),
                        },
                    );
                }
                Err(e) => {
                    error!("Failed to update {} {}: {}", entry.record_type, entry.name, e);
                    report.note(
                        &entry.name,
                        Some(entry.record_type),
                        HostOutcome::UpdateFailed {
                            record_id: entry.record_id.clone(),
                            error: e.to_string(),
                        },
                    );
                    for rest in &entries[index + 1..] {
                        report.note(
                            &rest.name,
                            Some(rest.record_type),
                            HostOutcome::NotAttempted {
                                record_id: rest.record_id.clone(),
                            },
                        );
                    }
                    return ReconcileStatus::PartiallyFailed;
                }
            }
        }

        ReconcileStatus::Succeeded
    }
}

fn display_target(address: Option<&crate::address::Address>) -> String {
    address
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string())
}
