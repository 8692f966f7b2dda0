//! Address resolution with a bounded retry budget
//!
//! The resolver turns an [`IpSource`]'s raw response into a validated
//! address of the source's family.
//!
//! ## Retry Policy
//!
//! - Malformed or wrong-family bodies are retried immediately, up to
//!   [`MAX_ATTEMPTS`] requests in total (no delay between attempts)
//! - Transport errors are returned at once and never retried
//! - Running out of attempts yields [`Error::ResolutionExhausted`]

use std::net::IpAddr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::{IpSource, IpVersion};

/// Total requests made before giving up (one try plus three retries)
pub const MAX_ATTEMPTS: usize = 4;

/// Resolve the public address of the source's family
///
/// # Returns
///
/// - `Ok(IpAddr)`: an address of `source.version()`
/// - `Err(Error::ResolutionExhausted)`: every attempt was malformed
/// - `Err(Error)`: the source failed to complete a request
pub async fn resolve(source: &dyn IpSource) -> Result<IpAddr> {
    let version = source.version();

    for attempt in 1..=MAX_ATTEMPTS {
        let body = source.query().await?;

        match parse_for_version(&body, version) {
            Some(ip) => {
                debug!("Resolved {} address {} on attempt {}", version, ip, attempt);
                return Ok(ip);
            }
            None => debug!(
                "Attempt {}/{}: {} returned no usable {} address: {:?}",
                attempt,
                MAX_ATTEMPTS,
                source.source_name(),
                version,
                body.trim()
            ),
        }
    }

    Err(Error::ResolutionExhausted {
        version,
        attempts: MAX_ATTEMPTS,
    })
}

/// Parse a response body as an address of the given family
///
/// IPv4-mapped IPv6 literals (`::ffff:a.b.c.d`) count as IPv4 and are
/// returned in their IPv4 form; they are never accepted as IPv6.
pub fn parse_for_version(body: &str, version: IpVersion) -> Option<IpAddr> {
    let ip: IpAddr = body.trim().parse().ok()?;

    match (version, ip) {
        (IpVersion::V4, IpAddr::V4(_)) => Some(ip),
        (IpVersion::V4, IpAddr::V6(v6)) => v6.to_ipv4_mapped().map(IpAddr::V4),
        (IpVersion::V6, IpAddr::V6(v6)) if v6.to_ipv4_mapped().is_none() => Some(ip),
        (IpVersion::V6, _) => None,
    }
}
