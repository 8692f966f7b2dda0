// # IP Source Trait
//
// Defines the interface for discovering the caller's public address of one
// IP family.
//
// ## Implementations
//
// - HTTP echo endpoint pinned to one family: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::resolver;
//
// let source = /* IpSource implementation */;
//
// // Parsing, family validation and retries are owned by the resolver
// let address = resolver::resolve(&source).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use crate::traits::dns_provider::RecordType;

/// IP family (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Family of an address as it is represented, without unmapping
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    /// DNS record type that publishes addresses of this family
    pub fn record_type(self) -> RecordType {
        match self {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// Trait for IP source implementations
///
/// A source answers a single question: "what does the echo endpoint say my
/// address is, when reached over this family?".
///
/// # Single-shot
///
/// `query()` performs exactly one request and returns the raw response
/// body. Sources must not parse, validate, or retry: a malformed body is
/// returned as-is and the resolver decides whether to ask again. Only
/// transport failures (connect, timeout, body read) are errors here, and
/// those are never retried.
///
/// Sources must not spawn tasks or sleep.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the echo endpoint's response body
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the untrimmed response body
    /// - `Err(Error::IpSource)`: the request could not be completed
    async fn query(&self) -> Result<String, crate::Error>;

    /// The family this source is pinned to
    fn version(&self) -> IpVersion;

    /// Human-readable identifier for logs (usually the URL)
    fn source_name(&self) -> &str;
}
