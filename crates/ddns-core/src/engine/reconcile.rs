//! Compare-then-write reconciliation of a single record
//!
//! ## Flow
//!
//! 1. List records matching {name, type}
//! 2. None → create with the resolved address
//! 3. First match equal to the address → nothing to do
//! 4. First match different → update that record by ID
//!
//! Only the first match is authoritative. Additional matches are reported
//! with a warning and left untouched.

use std::net::IpAddr;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpVersion, RecordSelector, UpdateResult};

/// Bring the record described by `selector` in line with `address`
///
/// # Returns
///
/// - `Ok(UpdateResult::Unchanged)`: no write was issued
/// - `Ok(UpdateResult::Created)` / `Ok(UpdateResult::Updated)`: one write was issued
/// - `Err(Error)`: lookup or write failed
pub async fn reconcile(
    provider: &dyn DnsProvider,
    zone_id: &str,
    selector: &RecordSelector,
    address: IpAddr,
) -> Result<UpdateResult> {
    if IpVersion::of(&address).record_type() != selector.record_type {
        return Err(Error::invalid_input(format!(
            "{} record cannot hold address {}",
            selector.record_type, address
        )));
    }

    let content = address.to_string();
    let existing = provider.list_records(zone_id, selector).await?;

    if existing.len() > 1 {
        warn!(
            "{} {} records match {}, only the first ({}) is managed",
            existing.len(),
            selector.record_type,
            selector.name,
            existing[0].id
        );
    }

    let Some(record) = existing.first() else {
        trace!(
            "{} record not found for {}, creating it with {}",
            selector.record_type, selector.name, content
        );
        provider.create_record(zone_id, selector, &content).await?;
        return Ok(UpdateResult::Created { new_ip: address });
    };

    trace!("{} record found for {} ({})", selector.record_type, selector.name, record.id);

    if record.content == content {
        trace!(
            "{} record already points at {}, no need to update",
            selector.record_type, content
        );
        return Ok(UpdateResult::Unchanged {
            current_ip: address,
        });
    }

    debug!(
        "Updating {} record {}: {} -> {}",
        selector.record_type, selector.name, record.content, content
    );
    provider
        .update_record(zone_id, &record.id, selector, &content)
        .await?;

    Ok(UpdateResult::Updated {
        previous_content: record.content.clone(),
        new_ip: address,
    })
}
