// # DNS Provider Trait
//
// Defines the interface to a managed DNS provider's record API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordSelector, RecordType};
//
// let provider = /* DnsProvider implementation */;
// let zone_id = provider.zone_id("example.com").await?;
//
// let selector = RecordSelector::new("home.example.com", RecordType::A);
// let records = provider.list_records(&zone_id, &selector).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// DNS record type managed by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(self) -> &'static str {
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

/// Which records to look up: one hostname, one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSelector {
    /// Fully-qualified record name (e.g. "home.example.com")
    pub name: String,
    /// A or AAAA
    pub record_type: RecordType,
}

impl RecordSelector {
    pub fn new(name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type,
        }
    }
}

/// An existing record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned opaque identifier
    pub id: String,
    /// Record name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Currently published content (the IP address text)
    pub content: String,
}

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record existed with different content and was rewritten
    Updated {
        /// Content the record held before the update
        previous_content: String,
        /// The new IP address
        new_ip: IpAddr,
    },
    /// Record already had the correct content (no write issued)
    Unchanged {
        /// The current IP address
        current_ip: IpAddr,
    },
    /// Record did not exist and was created
    Created {
        /// The created IP address
        new_ip: IpAddr,
    },
}

/// Credentials for the provider account
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// Global API key
    /// ⚠️ NEVER log this value
    pub api_key: String,
    /// Account email the key belongs to
    pub email: String,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &"<REDACTED>")
            .field("email", &self.email)
            .finish()
    }
}

/// Trait for DNS provider implementations
///
/// # Single-shot
///
/// Every method issues exactly one API call and reports its outcome.
/// Providers must not retry, sleep, spawn tasks, or cache anything beyond
/// what they were constructed with. Deciding whether a write is needed is
/// the reconciler's job, not the provider's.
///
/// Provider-reported failures (including validation errors enumerated in
/// the response) are logged by the provider, one line per entry, and then
/// returned as an error.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name (e.g. "example.com") to its provider ID
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the zone ID
    /// - `Err(Error::NotFound)`: no zone with that name is visible
    /// - `Err(Error)`: the request failed
    async fn zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List records in a zone matching the selector
    ///
    /// An empty vector means no such record exists.
    async fn list_records(
        &self,
        zone_id: &str,
        selector: &RecordSelector,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record of the selector's name and type with `content`
    async fn create_record(
        &self,
        zone_id: &str,
        selector: &RecordSelector,
        content: &str,
    ) -> Result<(), crate::Error>;

    /// Rewrite the content of the record identified by `record_id`
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        selector: &RecordSelector,
        content: &str,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Constructs a provider client from credentials
///
/// Construction happens lazily on the first tick and is cached by the
/// engine; a failure here stops the loop.
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance
    ///
    /// # Parameters
    ///
    /// - `credentials`: Account credentials
    /// - `http_timeout`: Per-request timeout for API calls
    fn create(
        &self,
        credentials: &ProviderCredentials,
        http_timeout: Duration,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
