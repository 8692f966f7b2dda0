//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Ask an echo endpoint for the public address of one family
//! - [`DnsProvider`]: Look up, create and update records via a provider API

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::{
    DnsProvider, DnsProviderFactory, DnsRecord, ProviderCredentials, RecordSelector, RecordType,
    UpdateResult,
};
pub use ip_source::{IpSource, IpVersion};
