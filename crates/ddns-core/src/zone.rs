//! Zone resolution
//!
//! Assigns each requested host to the provider zone that owns it. A zone
//! owns a host when the zone's labels are a right-aligned suffix of the
//! host's labels, so `example.com` owns `example.com` and
//! `vpn.example.com` but not `notexample.com` or `example.com.evil.com`.
//! Comparison is ASCII case-insensitive and ignores a trailing root dot.

use crate::error::{Error, Result};
use crate::traits::Zone;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum length of a host name (RFC 1035)
const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single label (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// Which zone wins when several zones own a host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneMatchPolicy {
    /// The owning zone with the most labels; provider order breaks ties
    #[default]
    LongestSuffix,
    /// The first owning zone in provider order
    FirstMatch,
}

/// One requested host name and, once resolved, its owning zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRequest {
    /// Normalized fully-qualified name
    pub fullname: String,
    /// Owning zone id, `None` while unresolved
    pub zone_id: Option<String>,
    /// Owning zone name, `None` while unresolved
    pub matched_zone: Option<String>,
}

impl HostRequest {
    pub fn new(fullname: impl Into<String>) -> Self {
        Self {
            fullname: fullname.into(),
            zone_id: None,
            matched_zone: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.zone_id.is_some()
    }
}

/// Split a raw host list into normalized, de-duplicated names
///
/// Entries are trimmed, lower-cased and stripped of a trailing dot. Empty
/// entries are dropped. Fails only when nothing is left.
pub fn parse_host_list(raw: &str, delimiter: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();

    for entry in raw.split(delimiter) {
        let name = normalize_name(entry);
        if name.is_empty() || names.contains(&name) {
            continue;
        }
        names.push(name);
    }

    if names.is_empty() {
        return Err(Error::bad_parameter("empty host list"));
    }

    Ok(names)
}

/// Whether `name` is a syntactically usable host name
///
/// Underscores are tolerated since providers accept them in record names.
/// A leftmost `*` label names a wildcard record.
pub fn is_valid_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }

    let labels = name.strip_prefix("*.").unwrap_or(name);

    labels.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

/// Whether `zone_name` owns `host` on label boundaries
pub fn zone_owns(zone_name: &str, host: &str) -> bool {
    let zone = normalize_name(zone_name);
    let host = normalize_name(host);

    if zone.is_empty() || host.is_empty() {
        return false;
    }

    let mut zone_labels = zone.rsplit('.');
    let mut host_labels = host.rsplit('.');

    loop {
        match (zone_labels.next(), host_labels.next()) {
            (None, _) => return true,
            (Some(_), None) => return false,
            (Some(z), Some(h)) if z != h => return false,
            _ => {}
        }
    }
}

/// Assign owning zones to hosts
///
/// Returns enriched copies in input order. Hosts no zone owns are returned
/// unresolved; dropping them is up to the caller.
pub fn resolve(zones: &[Zone], hosts: &[HostRequest], policy: ZoneMatchPolicy) -> Vec<HostRequest> {
    hosts
        .iter()
        .map(|host| {
            let mut host = host.clone();
            if let Some(zone) = find_owner(zones, &host.fullname, policy) {
                debug!("Host {} belongs to zone {} ({})", host.fullname, zone.name, zone.id);
                host.zone_id = Some(zone.id.clone());
                host.matched_zone = Some(zone.name.clone());
            } else {
                debug!("No zone owns host {}", host.fullname);
            }
            host
        })
        .collect()
}

fn find_owner<'a>(zones: &'a [Zone], host: &str, policy: ZoneMatchPolicy) -> Option<&'a Zone> {
    let mut owners = zones.iter().filter(|zone| zone_owns(&zone.name, host));

    match policy {
        ZoneMatchPolicy::FirstMatch => owners.next(),
        ZoneMatchPolicy::LongestSuffix => owners.fold(None::<&Zone>, |best, zone| match best {
            Some(current) if label_count(&current.name) >= label_count(&zone.name) => Some(current),
            _ => Some(zone),
        }),
    }
}

fn label_count(name: &str) -> usize {
    normalize_name(name).split('.').count()
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}
