// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 transport for the reconciler.
//
// ## Behavior
//
// - ✅ One HTTP request per trait call (zone listing follows pagination)
// - ✅ Full error propagation; the reconciler decides what a failure means
// - ✅ Authentication failures reported as `Error::Authentication`
// - ✅ Configurable HTTP timeout and API base
// - ✅ Dry-run mode: lookups are real, PATCH requests are only logged
// - ✅ Both A and AAAA records
// - ❌ NO retry or backoff
// - ❌ NO caching between calls
// - ❌ NO record creation or deletion
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?page=N&per_page=50`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::{DEFAULT_CLOUDFLARE_API_BASE, ProviderConfig};
use ddns_core::traits::{DnsProvider, DnsRecord, RecordType, Zone};
use ddns_core::{Error, Result, UpdatePlanEntry};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER_NAME: &str = "cloudflare";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for zone listing
const ZONES_PER_PAGE: u32 = 50;

/// API error codes meaning the credentials were rejected
///
/// 6003 invalid request headers, 6103 invalid X-Auth-Key format,
/// 6111 invalid Authorization header format, 9103 unknown X-Auth-Key,
/// 9106 missing auth headers, 9109 unauthorized / max auth failures,
/// 10000 authentication error.
const AUTH_ERROR_CODES: &[u64] = &[6003, 6103, 6111, 9103, 9106, 9109, 10000];

/// Response envelope shared by every v4 endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: u64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ZoneResult {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
    id: String,
    name: String,
    content: String,
    #[serde(default = "automatic_ttl")]
    ttl: u32,
    #[serde(default)]
    proxied: bool,
}

/// PATCH payload; exactly the fields the update replaces
#[derive(Debug, Serialize)]
struct PatchRecordRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

impl<'a> From<&'a UpdatePlanEntry> for PatchRecordRequest<'a> {
    fn from(entry: &'a UpdatePlanEntry) -> Self {
        Self {
            record_type: entry.record_type.as_str(),
            name: &entry.name,
            content: &entry.content,
            ttl: entry.ttl,
            proxied: entry.proxied,
        }
    }
}

/// TTL value meaning "automatic"
fn automatic_ttl() -> u32 {
    1
}

/// Cloudflare DNS provider
///
/// Stateless: every trait call goes to the API.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone listing, record lookup)
/// - Log the intended PATCH payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PATCH updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `api_base`: API base URL, `None` for the public v4 endpoint
    /// - `timeout`: Per-request HTTP timeout
    /// - `dry_run`: If true, perform GET requests but skip PATCH updates
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token is empty or the HTTP
    /// client cannot be built.
    pub fn new(
        api_token: impl Into<String>,
        api_base: Option<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = api_base
            .as_deref()
            .unwrap_or(DEFAULT_CLOUDFLARE_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_token,
            api_base,
            client,
            dry_run,
        })
    }

    /// Create a provider from its configuration section
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        match config {
            ProviderConfig::Cloudflare {
                api_token,
                api_base,
                timeout_secs,
                dry_run,
            } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }
                Self::new(
                    api_token.clone(),
                    api_base.clone(),
                    Duration::from_secs(*timeout_secs),
                    *dry_run,
                )
            }
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send a request and unwrap the response envelope
    ///
    /// `action` names the operation in error messages.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<ApiResponse<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("{} failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{} failed reading response: {}", action, e)))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::rate_limited(format!(
                "{} rejected: rate limit exceeded. Status: {}",
                action, status
            )));
        }

        let envelope = match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Err(match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::auth(format!(
                        "Invalid API token or insufficient permissions. Status: {}",
                        status
                    )),
                    _ if status.is_success() => Error::provider(
                        PROVIDER_NAME,
                        format!("{}: failed to parse response: {}", action, e),
                    ),
                    _ => Error::provider(
                        PROVIDER_NAME,
                        format!("{} failed: unexpected response. Status: {}", action, status),
                    ),
                });
            }
        };

        if envelope.success && status.is_success() {
            return Ok(envelope);
        }

        Err(envelope_error(action, status, &envelope.errors))
    }

    /// One page of the zone listing
    async fn zones_page(&self, page: u32) -> Result<(Vec<ZoneResult>, Option<ResultInfo>)> {
        let request = self.client.get(self.url("/zones")).query(&[
            ("page", page.to_string()),
            ("per_page", ZONES_PER_PAGE.to_string()),
        ]);

        let envelope: ApiResponse<Vec<ZoneResult>> = self.send(request, "Zone listing").await?;
        Ok((envelope.result.unwrap_or_default(), envelope.result_info))
    }
}

/// Map an unsuccessful envelope to an error
fn envelope_error(action: &str, status: StatusCode, errors: &[ApiMessage]) -> Error {
    let detail = if errors.is_empty() {
        format!("Status: {}", status)
    } else {
        errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    };

    let auth = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || errors.iter().any(|e| AUTH_ERROR_CODES.contains(&e.code));

    if auth {
        Error::auth(detail)
    } else {
        Error::provider(PROVIDER_NAME, format!("{} failed: {}", action, detail))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// List all zones visible to the token
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones?page=1&per_page=50
    /// Authorization: Bearer <token>
    /// ```
    ///
    /// Further pages are requested until `result_info.total_pages` is reached.
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let mut zones = Vec::new();
        let mut page = 1;

        loop {
            let (results, info) = self.zones_page(page).await?;
            zones.extend(results.into_iter().map(|z| Zone::new(z.id, z.name)));

            match info {
                Some(info) if info.page.max(page) < info.total_pages => page += 1,
                _ => break,
            }
        }

        tracing::debug!("Cloudflare returned {} zone(s)", zones.len());
        Ok(zones)
    }

    /// Look up existing records
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=vpn.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn find_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Looking up record: {} (type: {})", name, record_type);

        let request = self
            .client
            .get(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .query(&[("type", record_type.as_str()), ("name", name)]);

        let envelope: ApiResponse<Vec<RecordResult>> = self.send(request, "Record lookup").await?;

        Ok(envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .map(|r| DnsRecord {
                id: r.id,
                zone_id: zone_id.to_string(),
                record_type,
                name: r.name,
                content: r.content,
                ttl: r.ttl,
                proxied: r.proxied,
            })
            .collect())
    }

    /// Replace the record's fields with the plan entry
    ///
    /// # API Call (skipped in dry-run mode)
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A",
    ///   "name": "vpn.example.com",
    ///   "content": "203.0.113.5",
    ///   "ttl": 1,
    ///   "proxied": false
    /// }
    /// ```
    async fn patch_record(&self, entry: &UpdatePlanEntry) -> Result<()> {
        let url = self.url(&format!(
            "/zones/{}/dns_records/{}",
            entry.zone_id, entry.record_id
        ));
        let payload = PatchRecordRequest::from(entry);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                serde_json::to_string(&payload).unwrap_or_default()
            );
            return Ok(());
        }

        let request = self.client.patch(&url).json(&payload);
        let _: ApiResponse<serde_json::Value> = self.send(request, "Record update").await?;

        tracing::debug!("Cloudflare accepted update of record {}", entry.record_id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
