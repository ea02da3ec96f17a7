// # ddns-update - One-shot DDNS updater
//
// This binary is a THIN integration layer:
// 1. Parsing the positional arguments
// 2. Reading configuration from environment variables
// 3. Building the Cloudflare provider and the optional IP discovery source
// 4. Running one reconciliation and printing its result token
//
// All DDNS logic lives in ddns-core.
//
// ## Usage
//
// ```bash
// ddns-update <account> <token> <hostnames> <ipv4>
// ```
//
// - `account`: accepted for compatibility with dyndns-style callers, unused
// - `token`: Cloudflare API token
// - `hostnames`: host names joined by `---` (see `DDNS_HOST_DELIMITER`)
// - `ipv4`: IPv4 address to publish; may be empty when discovery is on
//
// Exactly one token is printed on stdout: `good`, `badauth`, `badparam`
// or `911`. Logs go to stderr.
//
// ## Configuration
//
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
// - `DDNS_MODE`: live (default) or dry-run
// - `DDNS_API_BASE`: Cloudflare API base URL
// - `DDNS_HTTP_TIMEOUT_SECS`: HTTP timeout, 1-300 (default 30)
// - `DDNS_IP_DISCOVERY`: on (default) or off
// - `DDNS_IP_DISCOVERY_URL`: discovery endpoint (default https://api64.ipify.org)
// - `DDNS_ZONE_MATCH`: longest (default) or first
// - `DDNS_RECORD_SELECTION`: first (default) or reject-ambiguous
// - `DDNS_SKIP_UNCHANGED`: skip PATCH when the record already holds the address
// - `DDNS_HOST_DELIMITER`: host list delimiter (default `---`)
// - `DDNS_REPORT`: `json` prints the full run report to stderr

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use config::Config;
use ddns_core::{IpSourceConfig, ReconcileResult, Reconciler, RunRequest};
use ddns_provider_cloudflare::CloudflareProvider;
use output::Output;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Update existing Cloudflare A/AAAA records to the current address
#[derive(Parser, Debug)]
#[command(name = "ddns-update", version)]
struct Cli {
    /// Account name (unused, kept for dyndns-style callers)
    account: String,

    /// Cloudflare API token
    token: String,

    /// Host names joined by the host delimiter
    hostnames: String,

    /// IPv4 address to publish
    ipv4: String,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e);
            return Output::BadParam.emit();
        }
    };

    // Load and validate configuration from environment
    let (config, log_level) = match Config::from_env().and_then(|config| {
        let level = config.validate()?;
        Ok((config, level))
    }) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return Output::BadParam.emit();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Output::ServerError.emit();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Output::ServerError.emit();
        }
    };

    match rt.block_on(run(&cli, &config)) {
        Ok(report) => {
            if config.report_json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => eprintln!("{}", json),
                    Err(e) => warn!("Failed to serialize run report: {}", e),
                }
            }
            Output::from(report.status).emit()
        }
        Err(e) => {
            error!("{:#}", e);
            Output::BadParam.emit()
        }
    }
}

/// Build the collaborators and run one reconciliation
///
/// Only setup failures are returned as errors; the run itself always
/// yields a report.
async fn run(cli: &Cli, config: &Config) -> Result<ReconcileResult> {
    let ddns_config = config.ddns_config(&cli.token)?;

    info!(
        "Starting ddns-update ({} mode)",
        if config.dry_run { "DRY-RUN" } else { "LIVE" }
    );

    let provider = CloudflareProvider::from_config(&ddns_config.provider)
        .context("Failed to create Cloudflare provider")?;

    let reconciler = Reconciler::new(Box::new(provider), ddns_config.reconcile.clone())
        .context("Invalid reconcile settings")?;

    let reconciler = match &ddns_config.ip_source {
        Some(source_config) => attach_ip_source(reconciler, source_config)?,
        None => reconciler,
    };

    let mut request = RunRequest::new(cli.hostnames.clone());
    if !cli.ipv4.trim().is_empty() {
        request = request.with_address(cli.ipv4.clone());
    }

    Ok(reconciler.run(&request).await)
}

#[cfg(feature = "http")]
fn attach_ip_source(reconciler: Reconciler, source_config: &IpSourceConfig) -> Result<Reconciler> {
    let source = ddns_ip_http::HttpIpSource::from_config(source_config)
        .context("Failed to create HTTP IP source")?;
    info!("Public IP discovery via {}", source.url());
    Ok(reconciler.with_ip_source(Box::new(source)))
}

#[cfg(not(feature = "http"))]
fn attach_ip_source(reconciler: Reconciler, _source_config: &IpSourceConfig) -> Result<Reconciler> {
    warn!("IP discovery requested but the http feature is disabled");
    Ok(reconciler)
}
