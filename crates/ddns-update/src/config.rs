//! Environment configuration for ddns-update
//!
//! Everything except the positional arguments comes from `DDNS_*`
//! environment variables. Unset variables fall back to the library defaults.

use anyhow::{Context, Result};
use ddns_core::config::{DEFAULT_HOST_DELIMITER, DEFAULT_IP_DISCOVERY_URL};
use ddns_core::{DdnsConfig, IpSourceConfig, ProviderConfig, ReconcileConfig};
use ddns_core::{SelectionStrategy, ZoneMatchPolicy};
use std::env;
use tracing::Level;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub dry_run: bool,
    pub api_base: Option<String>,
    pub http_timeout_secs: u64,
    pub ip_discovery: bool,
    pub ip_discovery_url: String,
    pub zone_match: ZoneMatchPolicy,
    pub record_selection: SelectionStrategy,
    pub skip_unchanged: bool,
    pub host_delimiter: String,
    pub report_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mode = lookup("DDNS_MODE").unwrap_or_else(|| "live".to_string());
        let dry_run = match mode.to_lowercase().as_str() {
            "live" => false,
            "dry-run" => true,
            _ => anyhow::bail!("DDNS_MODE '{}' is not valid. Valid modes: live, dry-run", mode),
        };

        let http_timeout_secs = match lookup("DDNS_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("DDNS_HTTP_TIMEOUT_SECS must be a number. Got: {}", raw))?,
            None => 30,
        };

        let zone_match = match lookup("DDNS_ZONE_MATCH").as_deref().map(str::to_lowercase) {
            None => ZoneMatchPolicy::default(),
            Some(v) if v == "longest" => ZoneMatchPolicy::LongestSuffix,
            Some(v) if v == "first" => ZoneMatchPolicy::FirstMatch,
            Some(v) => anyhow::bail!(
                "DDNS_ZONE_MATCH '{}' is not valid. Valid values: longest, first",
                v
            ),
        };

        let record_selection = match lookup("DDNS_RECORD_SELECTION")
            .as_deref()
            .map(str::to_lowercase)
        {
            None => SelectionStrategy::default(),
            Some(v) if v == "first" => SelectionStrategy::First,
            Some(v) if v == "reject-ambiguous" => SelectionStrategy::RejectAmbiguous,
            Some(v) => anyhow::bail!(
                "DDNS_RECORD_SELECTION '{}' is not valid. Valid values: first, reject-ambiguous",
                v
            ),
        };

        let report_json = match lookup("DDNS_REPORT") {
            None => false,
            Some(v) if v.eq_ignore_ascii_case("json") => true,
            Some(v) => anyhow::bail!("DDNS_REPORT '{}' is not valid. Valid values: json", v),
        };

        Ok(Self {
            log_level: lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            dry_run,
            api_base: lookup("DDNS_API_BASE").filter(|s| !s.is_empty()),
            http_timeout_secs,
            ip_discovery: parse_flag("DDNS_IP_DISCOVERY", lookup("DDNS_IP_DISCOVERY"), true)?,
            ip_discovery_url: lookup("DDNS_IP_DISCOVERY_URL")
                .unwrap_or_else(|| DEFAULT_IP_DISCOVERY_URL.to_string()),
            zone_match,
            record_selection,
            skip_unchanged: parse_flag(
                "DDNS_SKIP_UNCHANGED",
                lookup("DDNS_SKIP_UNCHANGED"),
                false,
            )?,
            host_delimiter: lookup("DDNS_HOST_DELIMITER")
                .unwrap_or_else(|| DEFAULT_HOST_DELIMITER.to_string()),
            report_json,
        })
    }

    /// Validate the settings that are not checked by the library config
    ///
    /// Returns the log level so callers parse it only once.
    pub fn validate(&self) -> Result<Level> {
        let level = self.tracing_level()?;

        if let Some(url) = &self.api_base
            && url.starts_with("http://")
        {
            eprintln!(
                "WARNING: DDNS_API_BASE uses HTTP (not HTTPS). \
                 The API token will be sent unencrypted."
            );
        }

        Ok(level)
    }

    /// Log level as a tracing level
    pub fn tracing_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Library configuration for one run with `api_token`
    pub fn ddns_config(&self, api_token: &str) -> Result<DdnsConfig> {
        let config = DdnsConfig {
            provider: ProviderConfig::Cloudflare {
                api_token: api_token.to_string(),
                api_base: self.api_base.clone(),
                timeout_secs: self.http_timeout_secs,
                dry_run: self.dry_run,
            },
            ip_source: self.ip_discovery.then(|| IpSourceConfig::Http {
                url: self.ip_discovery_url.clone(),
                timeout_secs: self.http_timeout_secs.min(10),
            }),
            reconcile: ReconcileConfig {
                zone_match: self.zone_match,
                record_selection: self.record_selection,
                skip_unchanged: self.skip_unchanged,
                host_delimiter: self.host_delimiter.clone(),
            },
        };

        config.validate().context("Configuration validation error")?;
        Ok(config)
    }
}

fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => anyhow::bail!("{} '{}' is not a valid flag. Use on or off", name, value),
    }
}
