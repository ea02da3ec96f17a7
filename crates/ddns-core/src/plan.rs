//! Update planning
//!
//! Turns located records into PATCH operations. Each entry carries every
//! field the provider needs for a field-replace update; `ttl` and
//! `proxied` are passed through from the located record untouched.

use crate::address::TargetAddresses;
use crate::traits::{DnsRecord, RecordType};
use serde::Serialize;

/// One pending update of exactly one existing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePlanEntry {
    pub record_id: String,
    pub zone_id: String,
    pub record_type: RecordType,
    pub name: String,
    /// New address literal
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
    /// Content before the update; diagnostics only, never sent
    pub previous_content: String,
}

impl UpdatePlanEntry {
    /// Whether the record already holds the new content
    pub fn is_unchanged(&self) -> bool {
        self.previous_content == self.content
    }
}

/// Build the plan for the located records
///
/// Records without a target address for their type produce no entry.
/// Entries are unique per record id: a record located twice keeps its
/// first position and the latest values.
pub fn plan(located: &[DnsRecord], targets: &TargetAddresses) -> Vec<UpdatePlanEntry> {
    let mut entries: Vec<UpdatePlanEntry> = Vec::with_capacity(located.len());

    for record in located {
        let Some(target) = targets.for_type(record.record_type) else {
            continue;
        };

        let entry = UpdatePlanEntry {
            record_id: record.id.clone(),
            zone_id: record.zone_id.clone(),
            record_type: record.record_type,
            name: record.name.clone(),
            content: target.to_string(),
            ttl: record.ttl,
            proxied: record.proxied,
            previous_content: record.content.clone(),
        };

        match entries.iter_mut().find(|e| e.record_id == entry.record_id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    entries
}
