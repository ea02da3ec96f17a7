// # DNS Provider Trait
//
// Defines the transport contract the reconciler needs from a DNS provider:
// list zones, look up existing records, and PATCH a record in place.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordType};
//
// async fn show(provider: &dyn DnsProvider) -> ddns_core::Result<()> {
//     for zone in provider.list_zones().await? {
//         let records = provider
//             .find_records(&zone.id, &zone.name, RecordType::A)
//             .await?;
//         println!("{}: {} A record(s)", zone.name, records.len());
//     }
//     Ok(())
// }
// ```

use crate::plan::UpdatePlanEntry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address record type handled by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name used by DNS providers
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side administrative domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Opaque provider identifier
    pub id: String,
    /// Zone apex, e.g. `example.com`
    pub name: String,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An existing record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Opaque provider record identifier
    pub id: String,
    /// Zone the record belongs to
    pub zone_id: String,
    /// A or AAAA
    pub record_type: RecordType,
    /// Fully-qualified record name
    pub name: String,
    /// Current address literal
    pub content: String,
    /// TTL in seconds, as reported by the provider
    pub ttl: u32,
    /// Provider proxy flag, as reported by the provider
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// Providers are thin transports. They perform exactly one API call per
/// method invocation (pagination aside) and report failures as errors;
/// every decision about what to update belongs to the reconciler.
///
/// Authentication failures MUST be reported as
/// [`Error::Authentication`](crate::Error::Authentication) so the reconciler
/// can tell them apart from "not found" (an empty result) and from generic
/// provider failures.
///
/// ## Forbidden Capabilities
/// - Retry logic or backoff
/// - Caching between calls
/// - Spawning tasks
/// - Creating or deleting zones and records
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every zone visible to the configured credentials, in provider order
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// Find existing records of `record_type` named `name` inside `zone_id`
    ///
    /// An empty vector means the record does not exist. Records are
    /// returned in provider order.
    async fn find_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Replace the fields of an existing record with the plan entry
    ///
    /// The provider sends `type`, `name`, `content`, `ttl` and `proxied`;
    /// the zone and record id only address the request.
    async fn patch_record(&self, entry: &UpdatePlanEntry) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
