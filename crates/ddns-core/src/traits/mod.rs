//! Collaborator traits for the DDNS reconciler
//!
//! This module defines the abstract interfaces the reconciler drives.
//!
//! - [`DnsProvider`]: List zones, find records, PATCH records via a provider API
//! - [`IpSource`]: Discover the current public address

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::{DnsProvider, DnsRecord, RecordType, Zone};
pub use ip_source::IpSource;
