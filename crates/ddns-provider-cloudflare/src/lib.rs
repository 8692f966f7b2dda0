// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 client used by the updater.
//
// ## Implementation Status
//
// - ✅ One HTTP request per trait call
// - ✅ Full error propagation to the engine
// - ✅ Per-request timeout (HTTP_TIMEOUT)
// - ✅ Specific error handling for HTTP status codes (401, 403, 404, 429, 5xx)
// - ✅ Every entry of a failed response's `errors[]` is logged
// - ✅ Both A and AAAA record support
// - ❌ NO retry logic (owned by the engine)
// - ❌ NO caching of zone IDs (owned by the engine's session)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, ProviderCredentials, RecordSelector,
};
use ddns_core::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const PROVIDER: &str = "cloudflare";

/// Response envelope shared by every v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

/// Cloudflare DNS provider
///
/// Authenticates with a global API key (`X-Auth-Key`) and the account
/// email (`X-Auth-Email`).
pub struct CloudflareProvider {
    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Account email
    email: String,

    /// API root, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_key", &"<REDACTED>")
            .field("email", &self.email)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `credentials`: API key and account email
    /// - `timeout`: Per-request timeout
    ///
    /// # Errors
    ///
    /// Empty credentials, or an HTTP client that cannot be built.
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self> {
        if credentials.api_key.is_empty() {
            return Err(Error::config("Cloudflare API key cannot be empty"));
        }
        if credentials.email.is_empty() {
            return Err(Error::config("Cloudflare account email cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: credentials.api_key.clone(),
            email: credentials.email.clone(),
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at a different API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, zone_id)
    }

    /// Send an authenticated request and unwrap the v4 envelope
    ///
    /// Every entry of `errors[]` is logged before a failure is returned.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<Option<T>> {
        let response = request
            .header("X-Auth-Email", &self.email)
            .header("X-Auth-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to read response: {}", e)))?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(status_error(status, action, &body)),
            Err(e) => {
                return Err(Error::provider(
                    PROVIDER,
                    format!("Failed to parse {} response: {}", action, e),
                ));
            }
        };

        for err in &envelope.errors {
            tracing::error!("Cloudflare {} error {}: {}", action, err.code, err.message);
        }

        let detail = envelope
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ");

        if !status.is_success() {
            return Err(status_error(status, action, &detail));
        }
        if !envelope.success {
            return Err(Error::provider(
                PROVIDER,
                format!("{} rejected: {}", action, detail),
            ));
        }

        Ok(envelope.result)
    }
}

/// Map a failed HTTP status to an error
fn status_error(status: StatusCode, action: &str, detail: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API key/email or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{}: {}", action, detail)),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER,
            format!("Cloudflare server error (transient): {} - {}", status, detail),
        ),
        _ => Error::provider(PROVIDER, format!("{} failed: {} - {}", action, status, detail)),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for {}", zone_name);

        let request = self
            .client
            .get(format!("{}/zones", self.api_base))
            .query(&[("name", zone_name)]);

        let zones: Vec<Zone> = self.send(request, "zone lookup").await?.unwrap_or_default();

        zones
            .into_iter()
            .next()
            .map(|zone| zone.id)
            .ok_or_else(|| Error::not_found(format!("Zone could not be found: {}", zone_name)))
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// ```
    async fn list_records(
        &self,
        zone_id: &str,
        selector: &RecordSelector,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!(
            "Listing {} records for {}",
            selector.record_type,
            selector.name
        );

        let request = self.client.get(self.records_url(zone_id)).query(&[
            ("name", selector.name.as_str()),
            ("type", selector.record_type.as_str()),
        ]);

        Ok(self.send(request, "record lookup").await?.unwrap_or_default())
    }

    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"type": "A", "name": "home.example.com", "content": "1.2.3.4"}
    /// ```
    async fn create_record(
        &self,
        zone_id: &str,
        selector: &RecordSelector,
        content: &str,
    ) -> Result<()> {
        let payload = serde_json::json!({
            "type": selector.record_type,
            "name": selector.name,
            "content": content,
        });

        let request = self.client.post(self.records_url(zone_id)).json(&payload);
        self.send::<IgnoredAny>(request, "record creation").await?;

        tracing::info!(
            "Created {} record {} -> {}",
            selector.record_type,
            selector.name,
            content
        );
        Ok(())
    }

    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {"type": "AAAA", "name": "home.example.com", "content": "2606:4700::1"}
    /// ```
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        selector: &RecordSelector,
        content: &str,
    ) -> Result<()> {
        let payload = serde_json::json!({
            "type": selector.record_type,
            "name": selector.name,
            "content": content,
        });

        let url = format!("{}/{}", self.records_url(zone_id), record_id);
        let request = self.client.patch(url).json(&payload);
        self.send::<IgnoredAny>(request, "record update").await?;

        tracing::info!(
            "Updated {} record {} -> {}",
            selector.record_type,
            selector.name,
            content
        );
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Cloudflare providers
#[derive(Debug, Clone, Default)]
pub struct CloudflareFactory {
    api_base: Option<String>,
}

impl CloudflareFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build providers against a different API root
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: Some(api_base.into()),
        }
    }
}

impl DnsProviderFactory for CloudflareFactory {
    fn create(
        &self,
        credentials: &ProviderCredentials,
        http_timeout: Duration,
    ) -> Result<Box<dyn DnsProvider>> {
        let provider = CloudflareProvider::new(credentials, http_timeout)?;
        let provider = match &self.api_base {
            Some(api_base) => provider.with_api_base(api_base.as_str()),
            None => provider,
        };
        Ok(Box::new(provider))
    }
}
