//! Test doubles and common utilities for reconciler contract tests
//!
//! The in-memory provider behaves like a real zone store: lookups filter
//! by (zone, name, type) and successful PATCHes change record content, so
//! a second run observes the first run's effect.

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, DnsRecord, IpSource, RecordType, Zone};
use ddns_core::{ReconcileConfig, Reconciler, UpdatePlanEntry};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How a mocked call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Credentials rejected
    Auth,
    /// Any other provider failure
    Provider,
}

impl Failure {
    fn to_error(self) -> Error {
        match self {
            Failure::Auth => Error::auth("invalid API token"),
            Failure::Provider => Error::provider("mock", "internal server error"),
        }
    }
}

#[derive(Default)]
struct MockState {
    zones: Vec<Zone>,
    records: Vec<DnsRecord>,
    list_zones_failure: Option<Failure>,
    find_failure: Option<Failure>,
    failing_patches: HashSet<String>,
    patched: Vec<UpdatePlanEntry>,
}

/// In-memory DnsProvider that tracks calls
///
/// Clones share state, so a test keeps one clone and hands another to the
/// reconciler.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<MockState>>,
    list_zones_calls: Arc<AtomicUsize>,
    find_calls: Arc<AtomicUsize>,
    patch_calls: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push(Zone::new(id, name));
        self
    }

    /// Add an existing record with TTL 300, not proxied
    pub fn with_record(
        self,
        zone_id: &str,
        id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Self {
        self.with_dns_record(DnsRecord {
            id: id.to_string(),
            zone_id: zone_id.to_string(),
            record_type,
            name: name.to_string(),
            content: content.to_string(),
            ttl: 300,
            proxied: false,
        })
    }

    pub fn with_dns_record(self, record: DnsRecord) -> Self {
        self.state.lock().unwrap().records.push(record);
        self
    }

    pub fn failing_list_zones(self, failure: Failure) -> Self {
        self.state.lock().unwrap().list_zones_failure = Some(failure);
        self
    }

    pub fn failing_lookups(self, failure: Failure) -> Self {
        self.state.lock().unwrap().find_failure = Some(failure);
        self
    }

    /// PATCH of `record_id` fails with a provider error
    pub fn failing_patch(self, record_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_patches
            .insert(record_id.to_string());
        self
    }

    pub fn list_zones_calls(&self) -> usize {
        self.list_zones_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// PATCH attempts, failed ones included
    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::SeqCst)
    }

    /// Successfully applied entries, in order
    pub fn patched(&self) -> Vec<UpdatePlanEntry> {
        self.state.lock().unwrap().patched.clone()
    }

    pub fn patched_ids(&self) -> Vec<String> {
        self.patched().into_iter().map(|e| e.record_id).collect()
    }

    /// Current content of a record
    pub fn content_of(&self, record_id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == record_id)
            .map(|r| r.content.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        match state.list_zones_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(state.zones.clone()),
        }
    }

    async fn find_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if let Some(failure) = state.find_failure {
            return Err(failure.to_error());
        }

        Ok(state
            .records
            .iter()
            .filter(|r| {
                r.zone_id == zone_id
                    && r.record_type == record_type
                    && r.name.eq_ignore_ascii_case(name)
            })
            .cloned()
            .collect())
    }

    async fn patch_record(&self, entry: &UpdatePlanEntry) -> Result<()> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.failing_patches.contains(&entry.record_id) {
            return Err(Failure::Provider.to_error());
        }

        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == entry.record_id && r.zone_id == entry.zone_id)
            .ok_or_else(|| Error::provider("mock", "record not found"))?;
        record.content = entry.content.clone();
        record.ttl = entry.ttl;
        record.proxied = entry.proxied;

        state.patched.push(entry.clone());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// IpSource answering with a fixed text body
pub struct StaticIpSource {
    body: String,
    calls: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// IpSource whose service is unreachable
pub struct UnreachableIpSource;

#[async_trait::async_trait]
impl IpSource for UnreachableIpSource {
    async fn current(&self) -> Result<String> {
        Err(Error::ip_source("connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "unreachable"
    }
}

/// Reconciler over a clone of `provider` with default settings
pub fn reconciler(provider: &MockDnsProvider) -> Reconciler {
    reconciler_with(provider, ReconcileConfig::default())
}

pub fn reconciler_with(provider: &MockDnsProvider, config: ReconcileConfig) -> Reconciler {
    Reconciler::new(Box::new(provider.clone()), config).expect("valid reconcile config")
}

/// One zone `example.com` with A records for the apex and `vpn`
pub fn example_com() -> MockDnsProvider {
    MockDnsProvider::new()
        .with_zone("Z1", "example.com")
        .with_record("Z1", "r-apex", RecordType::A, "example.com", "198.51.100.1")
        .with_record("Z1", "r-vpn", RecordType::A, "vpn.example.com", "198.51.100.1")
}
