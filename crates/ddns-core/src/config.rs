//! Configuration for the DDNS updater
//!
//! All configuration comes from environment variables and is read exactly
//! once at startup into an immutable [`DdnsConfig`]. Components receive the
//! values they need as explicit parameters.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `CLOUDFLARE_API_KEY` | yes | |
//! | `CLOUDFLARE_EMAIL` | yes | |
//! | `DNS_ZONE` | yes | |
//! | `SUBDOMAIN` | yes | |
//! | `DONT_UPDATE_A` | no | false |
//! | `DONT_UPDATE_AAAA` | no | false |
//! | `IPV4_QUERY_URL` | no | [`DEFAULT_QUERY_URL`] |
//! | `IPV6_QUERY_URL` | no | [`DEFAULT_QUERY_URL`] |
//! | `HTTP_TIMEOUT` | no | 5 (seconds) |
//! | `UPDATE_INTERVAL` | no | 5 (minutes) |
//! | `UPDATE_ONCE` | no | false |
//! | `DEBUG` | no | false |
//!
//! Boolean flags are enabled only by the exact string `"true"`. An empty
//! value is treated the same as an unset variable.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, trace, warn};

use crate::error::{Error, Result};
use crate::traits::{IpVersion, ProviderCredentials};

/// Echo endpoint used for both families unless overridden
pub const DEFAULT_QUERY_URL: &str = "https://icanhazip.com/";

/// Default per-request timeout, in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

/// Default pause between ticks, in minutes
pub const DEFAULT_UPDATE_INTERVAL_MINS: u64 = 5;

const TRUE: &str = "true";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Provider account credentials
    pub credentials: ProviderCredentials,

    /// Zone name to resolve to a zone ID (e.g. "example.com")
    pub zone: String,

    /// Hostname prefix inside the zone (e.g. "home")
    pub subdomain: String,

    /// Reconcile the A record
    pub update_a: bool,

    /// Reconcile the AAAA record
    pub update_aaaa: bool,

    /// Echo endpoint queried over IPv4
    pub ipv4_query_url: String,

    /// Echo endpoint queried over IPv6
    pub ipv6_query_url: String,

    /// Per-request timeout for every outbound HTTP call
    pub http_timeout: Duration,

    /// Pause between ticks
    pub update_interval: Duration,

    /// Stop after a single tick
    pub update_once: bool,

    /// Trace-level logging
    ///
    /// The binary also reads `DEBUG` before loading so the subscriber level
    /// is set before any configuration error is logged.
    pub debug: bool,
}

impl DdnsConfig {
    /// Create a configuration with defaults for every optional knob
    pub fn new(
        credentials: ProviderCredentials,
        zone: impl Into<String>,
        subdomain: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            zone: zone.into(),
            subdomain: subdomain.into(),
            update_a: true,
            update_aaaa: true,
            ipv4_query_url: DEFAULT_QUERY_URL.to_string(),
            ipv6_query_url: DEFAULT_QUERY_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_MINS * 60),
            update_once: false,
            debug: false,
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Required variables are checked in a fixed order so that a missing
    /// `CLOUDFLARE_API_KEY` is always reported first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let require = |name: &'static str| get(name).ok_or(Error::MissingEnv(name));
        let flag = |name: &str| get(name).is_some_and(|value| value == TRUE);

        let credentials = ProviderCredentials {
            api_key: require("CLOUDFLARE_API_KEY")?,
            email: require("CLOUDFLARE_EMAIL")?,
        };
        let mut config = Self::new(credentials, require("DNS_ZONE")?, require("SUBDOMAIN")?);

        config.update_a = !flag("DONT_UPDATE_A");
        config.update_aaaa = !flag("DONT_UPDATE_AAAA");
        config.update_once = flag("UPDATE_ONCE");
        config.debug = flag("DEBUG");

        if let Some(url) = get("IPV4_QUERY_URL") {
            config.ipv4_query_url = url;
        }
        if let Some(url) = get("IPV6_QUERY_URL") {
            config.ipv6_query_url = url;
        }
        if let Some(raw) = get("HTTP_TIMEOUT") {
            config.http_timeout = Duration::from_secs(parse_positive("HTTP_TIMEOUT", &raw)?);
        }
        if let Some(raw) = get("UPDATE_INTERVAL") {
            let minutes = parse_positive("UPDATE_INTERVAL", &raw)?;
            let secs = minutes
                .checked_mul(60)
                .ok_or_else(|| Error::invalid_env("UPDATE_INTERVAL", &raw, "too large"))?;
            config.update_interval = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.credentials.api_key.is_empty() {
            return Err(Error::MissingEnv("CLOUDFLARE_API_KEY"));
        }
        if self.credentials.email.is_empty() {
            return Err(Error::MissingEnv("CLOUDFLARE_EMAIL"));
        }
        if self.zone.is_empty() {
            return Err(Error::MissingEnv("DNS_ZONE"));
        }
        if self.subdomain.is_empty() {
            return Err(Error::MissingEnv("SUBDOMAIN"));
        }
        if self.http_timeout.is_zero() {
            return Err(Error::config("HTTP timeout must be > 0"));
        }
        if self.update_interval.is_zero() {
            return Err(Error::config("Update interval must be > 0"));
        }
        Ok(())
    }

    /// Full record name: `SUBDOMAIN.DNS_ZONE`
    pub fn record_name(&self) -> String {
        format!("{}.{}", self.subdomain, self.zone)
    }

    /// Echo endpoint for this family
    pub fn query_url(&self, version: IpVersion) -> &str {
        match version {
            IpVersion::V4 => &self.ipv4_query_url,
            IpVersion::V6 => &self.ipv6_query_url,
        }
    }

    /// Log every knob that differs from its default
    pub fn log_overrides(&self) {
        if self.debug {
            trace!("Debug mode enabled");
        }
        if self.http_timeout != Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS) {
            info!("Setting custom HTTP timeout to {} seconds", self.http_timeout.as_secs());
        }
        if self.update_interval != Duration::from_secs(DEFAULT_UPDATE_INTERVAL_MINS * 60) {
            info!(
                "Setting custom update interval to {} minutes",
                self.update_interval.as_secs() / 60
            );
        }
        if self.ipv4_query_url != DEFAULT_QUERY_URL {
            info!("Setting IPv4 query URL to {}", self.ipv4_query_url);
        }
        if self.ipv6_query_url != DEFAULT_QUERY_URL {
            info!("Setting IPv6 query URL to {}", self.ipv6_query_url);
        }
        if !self.update_a && !self.update_aaaa {
            warn!("Both DONT_UPDATE_A and DONT_UPDATE_AAAA are set, nothing will be updated");
        }
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64> {
    let value: u64 = raw
        .parse()
        .map_err(|e: std::num::ParseIntError| Error::invalid_env(name, raw, e.to_string()))?;
    if value == 0 {
        return Err(Error::invalid_env(name, raw, "must be greater than zero"));
    }
    Ok(value)
}
