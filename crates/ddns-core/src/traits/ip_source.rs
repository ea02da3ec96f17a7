// # IP Source Trait
//
// Defines the interface for discovering the current public IP address.
//
// ## Implementations
//
// - HTTP-based: `ddns-ip-http` crate
//
// The source hands back raw text. Classification (syntax, public range,
// family) is done by the reconciler so discovered and caller-supplied
// addresses go through the same checks.

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// # Trust Level: Semi-Trusted
///
/// An IP source only observes. It must not decide what to update, retry,
/// or cache across runs; a failure is reported once and the reconciler
/// decides whether the run can continue without it.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public address as text
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The address literal, surrounding whitespace trimmed
    /// - `Err(Error)`: If the discovery service could not be queried
    async fn current(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
