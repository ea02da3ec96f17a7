// # ddns-core
//
// Core library for one-shot dynamic DNS reconciliation.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for discovering the current public address
// - **DnsProvider**: Trait for listing zones, looking up and patching records
// - **address**: Public-address classification and per-family targets
// - **zone**: Host list parsing and label-aligned zone resolution
// - **locator**: Record lookup with a configurable selection strategy
// - **plan**: Update plan construction
// - **Reconciler**: Orchestrates one run and reports a single status
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider transports
// 2. **Update Only**: Existing records are patched; nothing is created or deleted
// 3. **Fail Fast**: The first update failure stops the run, nothing is rolled back
// 4. **Library-First**: All core functionality can be used as a library

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod locator;
pub mod plan;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use address::{Address, IpVersion, TargetAddresses};
pub use config::{DdnsConfig, IpSourceConfig, ProviderConfig, ReconcileConfig};
pub use engine::{
    AtomicityLevel, HostDiagnostic, HostOutcome, ReconcilePhase, ReconcileResult, ReconcileStatus,
    Reconciler, RunRequest,
};
pub use error::{Error, Result};
pub use locator::{Located, RecordLocator, SelectionStrategy};
pub use plan::UpdatePlanEntry;
pub use traits::{DnsProvider, DnsRecord, IpSource, RecordType, Zone};
pub use zone::{HostRequest, ZoneMatchPolicy};
