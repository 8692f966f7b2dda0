// # HTTP IP Source
//
// This crate provides the IP source used by the updater: a plain-text
// "what is my IP" echo endpoint (e.g. icanhazip.com) reached over one
// specific address family.
//
// ## Family Pinning
//
// The same URL usually answers over both IPv4 and IPv6, so the family is
// chosen by the transport, not the URL. Each source owns a reqwest client
// whose local address is the unspecified address of its family
// (`0.0.0.0` or `::`). The connector then only dials remote addresses of
// that family, even when the hostname resolves to both.
//
// ## Single-shot
//
// One GET per `query()`. The body is returned untouched; parsing, family
// validation and retries belong to `ddns_core::resolver`.

use async_trait::async_trait;
use ddns_core::traits::{IpSource, IpVersion};
use ddns_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// HTTP echo IP source pinned to one family
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// Family every connection is made over
    version: IpVersion,

    /// Family-pinned HTTP client
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpIpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIpSource")
            .field("url", &self.url)
            .field("version", &self.version)
            .finish()
    }
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Echo endpoint returning the caller's address as text
    /// - `version`: Family to dial over
    /// - `timeout`: Per-request timeout
    pub fn new(url: impl Into<String>, version: IpVersion, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::config(format!(
                "{} query URL must use HTTP or HTTPS scheme. Got: {}",
                version, url
            )));
        }

        let client = reqwest::Client::builder()
            .local_address(unspecified(version))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build {} client: {}", version, e)))?;

        Ok(Self {
            url,
            version,
            client,
        })
    }
}

/// Local bind address that restricts dialing to one family
fn unspecified(version: IpVersion) -> IpAddr {
    match version {
        IpVersion::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpVersion::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn query(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            Error::ip_source(format!("{} request to {} failed: {}", self.version, self.url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            // Not a transport failure: the body will fail to parse and
            // consume a resolver attempt like any other malformed answer.
            tracing::debug!("{} answered with HTTP {}", self.url, status);
        }

        response.text().await.map_err(|e| {
            Error::ip_source(format!("Failed to read response from {}: {}", self.url, e))
        })
    }

    fn version(&self) -> IpVersion {
        self.version
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}
