//! Record lookup
//!
//! Issues one provider lookup per (host, record type) and applies the
//! configured [`SelectionStrategy`] when the provider returns more than
//! one match. Provider failures are returned as errors; "no such record"
//! is a normal [`Located::NotFound`] outcome.

use crate::error::Result;
use crate::traits::{DnsProvider, DnsRecord, RecordType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do when several records match one (zone, name, type)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Use the first record in provider order, ignore the rest
    #[default]
    First,
    /// Leave the pair alone when the match is ambiguous
    RejectAmbiguous,
}

/// Outcome of a single record lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// The record that will be updated
    Found(DnsRecord),
    /// Provider answered, no record exists
    NotFound,
    /// Several records matched and the strategy refused to pick one
    Ambiguous(usize),
}

/// Looks up existing records through a [`DnsProvider`]
pub struct RecordLocator<'a> {
    provider: &'a dyn DnsProvider,
    strategy: SelectionStrategy,
}

impl<'a> RecordLocator<'a> {
    pub fn new(provider: &'a dyn DnsProvider, strategy: SelectionStrategy) -> Self {
        Self { provider, strategy }
    }

    /// Locate the record for `fullname` of `record_type` in `zone_id`
    ///
    /// # Errors
    ///
    /// Any provider failure. The reconciler treats it as fatal for the run.
    pub async fn locate(
        &self,
        zone_id: &str,
        fullname: &str,
        record_type: RecordType,
    ) -> Result<Located> {
        let records = self
            .provider
            .find_records(zone_id, fullname, record_type)
            .await?;

        debug!(
            "Lookup {} {} in zone {}: {} match(es)",
            record_type,
            fullname,
            zone_id,
            records.len()
        );

        Ok(select(records, self.strategy))
    }
}

fn select(records: Vec<DnsRecord>, strategy: SelectionStrategy) -> Located {
    match (strategy, records.len()) {
        (_, 0) => Located::NotFound,
        (SelectionStrategy::RejectAmbiguous, n) if n > 1 => Located::Ambiguous(n),
        _ => records
            .into_iter()
            .next()
            .map(Located::Found)
            .unwrap_or(Located::NotFound),
    }
}
