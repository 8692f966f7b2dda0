// # ddns-core
//
// Core library for the Cloudflare dynamic DNS updater.
//
// ## Architecture Overview
//
// One sequential reconciliation loop, split into three responsibilities:
// - **Address Resolver** (`resolver`): asks an `IpSource` for the public
//   address of one family and owns the malformed-response retry budget
// - **Record Reconciler** (`engine::reconcile`): compare-then-write of a
//   single A or AAAA record through a `DnsProvider`
// - **Scheduler** (`engine::DdnsEngine`): runs both families per tick,
//   caches the provider client and zone ID, sleeps between ticks
//
// ## Design Principles
//
// 1. **Separation of Concerns**: sources and providers are single-shot;
//    retry and scheduling decisions live here
// 2. **Explicit Context**: everything resolved once (client, zone ID) is
//    owned by the engine's session, never global
// 3. **Idempotency**: a record whose content already matches is never written
// 4. **Library-First**: the binary is a thin wrapper over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use config::DdnsConfig;
pub use engine::{DdnsEngine, FamilyOutcome, TickReport, TickSummary};
pub use error::{Error, Result};
pub use traits::{DnsProvider, DnsProviderFactory, IpSource, ProviderCredentials};
