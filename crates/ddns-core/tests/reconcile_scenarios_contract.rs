//! Contract Test: End-to-End Reconciliation
//!
//! Drives complete runs against the in-memory provider.
//!
//! Constraints verified:
//! - Every resolvable host with an existing record gets exactly one PATCH
//! - Credential failures abort before any PATCH
//! - Hosts without a zone or record are skipped, and an empty plan is an error
//! - TTL and proxy flags survive the update
//! - Wildcard record names are looked up and patched verbatim
//!
//! If this test fails, the run no longer reports what it did.

mod common;

use common::*;
use ddns_core::traits::{DnsRecord, RecordType};
use ddns_core::{HostOutcome, ReconcilePhase, ReconcileStatus, RunRequest};

#[tokio::test]
async fn scenario_a_all_hosts_updated() {
    let provider = example_com();
    let request = RunRequest::new("example.com---vpn.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::Succeeded);
    assert_eq!(result.phase, ReconcilePhase::Succeeded);
    assert_eq!(result.plan.len(), 2);
    assert_eq!(result.applied, 2);
    assert_eq!(provider.patch_calls(), 2);
    assert_eq!(provider.patched_ids(), vec!["r-apex", "r-vpn"]);
    assert_eq!(provider.content_of("r-apex").as_deref(), Some("203.0.113.5"));
    assert_eq!(provider.content_of("r-vpn").as_deref(), Some("203.0.113.5"));
    assert!(result.hosts.iter().all(|h| h.matched_zone.as_deref() == Some("example.com")));
}

#[tokio::test]
async fn scenario_b_invalid_credentials() {
    let provider = example_com().failing_list_zones(Failure::Auth);
    let request = RunRequest::new("example.com---vpn.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::AuthFailure);
    assert_eq!(result.phase, ReconcilePhase::Aborted);
    assert_eq!(result.last_phase, ReconcilePhase::Start);
    assert!(result.plan.is_empty());
    assert_eq!(provider.find_calls(), 0);
    assert_eq!(provider.patch_calls(), 0);
    assert!(result.message.is_some());
}

#[tokio::test]
async fn auth_failure_during_lookup_issues_no_patch() {
    let provider = example_com().failing_lookups(Failure::Auth);
    let request = RunRequest::new("vpn.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::AuthFailure);
    assert_eq!(result.last_phase, ReconcilePhase::ZonesResolved);
    assert_eq!(provider.patch_calls(), 0);
}

#[tokio::test]
async fn provider_failure_during_lookup_is_provider_error() {
    let provider = example_com().failing_lookups(Failure::Provider);
    let request = RunRequest::new("vpn.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::ProviderError);
    assert_eq!(provider.patch_calls(), 0);
}

#[tokio::test]
async fn scenario_c_unknown_host_is_bad_parameter() {
    let provider = example_com();
    let request = RunRequest::new("unknown.nowhere.tld").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::BadParameter);
    assert_eq!(result.last_phase, ReconcilePhase::RecordsLocated);
    assert!(result.plan.is_empty());
    assert_eq!(provider.find_calls(), 0);
    assert_eq!(provider.patch_calls(), 0);

    let diagnostics: Vec<_> = result.diagnostics_for("unknown.nowhere.tld").collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].outcome, HostOutcome::ZoneNotFound);
}

#[tokio::test]
async fn scenario_d_missing_record_alone_is_bad_parameter() {
    let provider = example_com().with_zone("Z2", "example.net");
    let request = RunRequest::new("www.example.net").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::BadParameter);
    assert_eq!(provider.find_calls(), 1);
    assert_eq!(provider.patch_calls(), 0);

    let diagnostics: Vec<_> = result.diagnostics_for("www.example.net").collect();
    assert_eq!(diagnostics[0].record_type, Some(RecordType::A));
    assert_eq!(diagnostics[0].outcome, HostOutcome::RecordNotFound);
}

#[tokio::test]
async fn scenario_d_missing_record_with_other_hosts_succeeds() {
    let provider = example_com().with_zone("Z2", "example.net");
    let request = RunRequest::new("www.example.net---vpn.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::Succeeded);
    assert_eq!(provider.patched_ids(), vec!["r-vpn"]);
    assert_eq!(
        result.diagnostics_for("www.example.net").next().map(|d| &d.outcome),
        Some(&HostOutcome::RecordNotFound)
    );
}

#[tokio::test]
async fn wildcard_record_is_updated() {
    let provider =
        example_com().with_record("Z1", "r-wild", RecordType::A, "*.example.com", "198.51.100.1");
    let request = RunRequest::new("*.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::Succeeded);
    assert_eq!(provider.patched_ids(), vec!["r-wild"]);
    assert_eq!(provider.patched()[0].name, "*.example.com");
    assert_eq!(provider.content_of("r-wild").as_deref(), Some("203.0.113.5"));
    assert_eq!(provider.content_of("r-vpn").as_deref(), Some("198.51.100.1"));
    assert_eq!(
        result.diagnostics_for("*.example.com").next().map(|d| &d.outcome),
        Some(&HostOutcome::Updated { record_id: "r-wild".to_string() })
    );
}

#[tokio::test]
async fn dual_stack_updates_both_record_types() {
    let provider = example_com().with_record(
        "Z1",
        "r-vpn6",
        RecordType::Aaaa,
        "vpn.example.com",
        "2001:db8::1",
    );
    let request = RunRequest::new("vpn.example.com")
        .with_address("203.0.113.5")
        .with_address("2001:db8::5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::Succeeded);
    assert_eq!(provider.patched_ids(), vec!["r-vpn", "r-vpn6"]);
    assert_eq!(provider.content_of("r-vpn6").as_deref(), Some("2001:db8::5"));
}

#[tokio::test]
async fn ipv6_only_leaves_a_records_alone() {
    let provider = example_com().with_record(
        "Z1",
        "r-vpn6",
        RecordType::Aaaa,
        "vpn.example.com",
        "2001:db8::1",
    );
    let request = RunRequest::new("vpn.example.com").with_address("2001:db8::5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::Succeeded);
    assert_eq!(provider.patched_ids(), vec!["r-vpn6"]);
    assert_eq!(provider.content_of("r-vpn").as_deref(), Some("198.51.100.1"));
}

#[tokio::test]
async fn ttl_and_proxied_are_preserved() {
    let provider = MockDnsProvider::new()
        .with_zone("Z1", "example.com")
        .with_dns_record(DnsRecord {
            id: "r-cdn".to_string(),
            zone_id: "Z1".to_string(),
            record_type: RecordType::A,
            name: "cdn.example.com".to_string(),
            content: "198.51.100.1".to_string(),
            ttl: 1,
            proxied: true,
        });
    let request = RunRequest::new("cdn.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::Succeeded);
    let patched = provider.patched();
    assert_eq!(patched.len(), 1);
    assert_eq!(patched[0].ttl, 1);
    assert!(patched[0].proxied);
    assert_eq!(patched[0].previous_content, "198.51.100.1");
}

#[tokio::test]
async fn empty_host_list_is_bad_parameter() {
    let provider = example_com();
    let request = RunRequest::new(" --- ").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::BadParameter);
    assert_eq!(provider.list_zones_calls(), 0);
}

#[tokio::test]
async fn host_names_are_normalized_and_deduplicated() {
    let provider = example_com();
    let request = RunRequest::new(" VPN.Example.com. ---vpn.example.com").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;

    assert_eq!(result.status, ReconcileStatus::Succeeded);
    assert_eq!(result.hosts.len(), 1);
    assert_eq!(result.hosts[0].fullname, "vpn.example.com");
    assert_eq!(provider.patch_calls(), 1);
}

#[tokio::test]
async fn report_serializes_to_json() {
    let provider = example_com();
    let request = RunRequest::new("vpn.example.com---nope.invalid").with_address("203.0.113.5");

    let result = reconciler(&provider).run(&request).await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["targets"]["ipv4"], "203.0.113.5");
    assert!(json["targets"]["ipv6"].is_null());
    assert_eq!(json["plan"][0]["record_id"], "r-vpn");
    assert_eq!(json["diagnostics"][0]["outcome"], "zone_not_found");
}
