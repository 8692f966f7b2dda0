//! Core DDNS engine
//!
//! The DdnsEngine is the scheduler of the reconciliation loop:
//! - Lazily constructs the provider client and resolves the zone ID once
//! - Resolves the public IPv4/IPv6 address via the resolver
//! - Reconciles the A/AAAA record via the reconciler
//! - Logs a per-tick summary and sleeps until the next tick
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐        ┌──────────────┐        ┌──────────────┐
//! │ IpSource (v4) │──┐     │              │        │              │
//! └───────────────┘  ├───▶ │  DdnsEngine  │──────▶ │ DnsProvider  │
//! ┌───────────────┐  │     │  (session)   │        │ (list/create │
//! │ IpSource (v6) │──┘     │              │        │  /update)    │
//! └───────────────┘        └──────────────┘        └──────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Provider client constructed once (failure stops the loop)
//! 2. Zone ID resolved once (failure stops the loop)
//! 3. A record: resolve IPv4, reconcile (failure only marks A unsuccessful)
//! 4. AAAA record: resolve IPv6, reconcile (independent of step 3)
//! 5. Summary line
//! 6. Stop if run-once, otherwise sleep for the update interval

pub mod reconcile;

use std::net::IpAddr;
use tracing::{debug, error, info, trace, warn};

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::resolver;
use crate::traits::{
    DnsProvider, DnsProviderFactory, IpSource, IpVersion, RecordSelector, UpdateResult,
};

pub use reconcile::reconcile;

/// What happened to one family during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyOutcome {
    /// Opted out by configuration; no remote call was made
    Skipped,
    /// Address resolved and record reconciled
    Succeeded(UpdateResult),
    /// Resolution or reconciliation failed
    Failed(String),
}

impl FamilyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FamilyOutcome::Succeeded(_))
    }
}

/// Which families succeeded in a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSummary {
    Both,
    AOnly,
    AaaaOnly,
    Neither,
}

/// Outcome of one full pass over both families
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub a: FamilyOutcome,
    pub aaaa: FamilyOutcome,
}

impl TickReport {
    pub fn summary(&self) -> TickSummary {
        match (self.a.is_success(), self.aaaa.is_success()) {
            (true, true) => TickSummary::Both,
            (true, false) => TickSummary::AOnly,
            (false, true) => TickSummary::AaaaOnly,
            (false, false) => TickSummary::Neither,
        }
    }

    /// Emit the one-line summary for this tick
    pub fn log_summary(&self) {
        match self.summary() {
            TickSummary::Both => info!("Both A and AAAA records updated successfully"),
            TickSummary::AOnly => info!("A record updated successfully"),
            TickSummary::AaaaOnly => info!("AAAA record updated successfully"),
            TickSummary::Neither
                if self.a == FamilyOutcome::Skipped && self.aaaa == FamilyOutcome::Skipped =>
            {
                warn!("Neither A nor AAAA record updated: both are disabled")
            }
            TickSummary::Neither => error!("Unable to update either A or AAAA record"),
        }
    }
}

/// State resolved once and reused across ticks
///
/// Both slots are filled on the first tick that gets that far and are
/// never cleared for the lifetime of the engine.
#[derive(Default)]
struct Session {
    provider: Option<Box<dyn DnsProvider>>,
    zone_id: Option<String>,
}

impl Session {
    /// Ensure the provider client and zone ID are available
    async fn prepare(
        &mut self,
        factory: &dyn DnsProviderFactory,
        config: &DdnsConfig,
    ) -> Result<(&dyn DnsProvider, &str)> {
        let provider = match self.provider.take() {
            Some(provider) => provider,
            None => {
                let provider = factory.create(&config.credentials, config.http_timeout)?;
                debug!("Constructed {} client", provider.provider_name());
                provider
            }
        };
        let provider: &dyn DnsProvider = &**self.provider.insert(provider);

        let zone_id = match self.zone_id.take() {
            Some(zone_id) => zone_id,
            None => {
                let zone_id = provider.zone_id(&config.zone).await?;
                debug!("Resolved zone {} to ID {}", config.zone, zone_id);
                zone_id
            }
        };

        Ok((provider, self.zone_id.insert(zone_id).as_str()))
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`]
/// 3. Returns after one tick when `update_once` is set, or when the
///    provider client or zone lookup fails; otherwise runs forever
///
/// ## Threading
///
/// Strictly sequential. Each remote call is awaited before the next one
/// starts and nothing is spawned.
pub struct DdnsEngine {
    /// Immutable configuration
    config: DdnsConfig,

    /// Builds the provider client on first use
    provider_factory: Box<dyn DnsProviderFactory>,

    /// Echo source pinned to IPv4
    ipv4_source: Box<dyn IpSource>,

    /// Echo source pinned to IPv6
    ipv6_source: Box<dyn IpSource>,

    /// Cached client and zone ID
    session: Session,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `config`: Validated configuration
    /// - `provider_factory`: Constructs the provider client on the first tick
    /// - `ipv4_source`: Source queried for the A record
    /// - `ipv6_source`: Source queried for the AAAA record
    pub fn new(
        config: DdnsConfig,
        provider_factory: Box<dyn DnsProviderFactory>,
        ipv4_source: Box<dyn IpSource>,
        ipv6_source: Box<dyn IpSource>,
    ) -> Result<Self> {
        config.validate()?;

        for (source, expected) in [(&ipv4_source, IpVersion::V4), (&ipv6_source, IpVersion::V6)] {
            if source.version() != expected {
                return Err(Error::config(format!(
                    "{} is pinned to {}, expected {}",
                    source.source_name(),
                    source.version(),
                    expected
                )));
            }
        }

        Ok(Self {
            config,
            provider_factory,
            ipv4_source,
            ipv6_source,
            session: Session::default(),
        })
    }

    /// Run the reconciliation loop
    ///
    /// # Returns
    ///
    /// - `Ok(())`: a single tick completed in run-once mode
    /// - `Err(Error)`: the provider client or zone ID could not be set up
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Starting DDNS updates for {} (A: {}, AAAA: {})",
            self.config.record_name(),
            if self.config.update_a { "on" } else { "off" },
            if self.config.update_aaaa { "on" } else { "off" },
        );

        loop {
            let report = match self.tick().await {
                Ok(report) => report,
                Err(e) => {
                    error!("{}", e);
                    return Err(e);
                }
            };
            report.log_summary();

            if self.config.update_once {
                debug!("UPDATE_ONCE is set, stopping after a single pass");
                return Ok(());
            }

            trace!("Next update in {:?}", self.config.update_interval);
            tokio::time::sleep(self.config.update_interval).await;
        }
    }

    /// Execute one full pass over both families
    ///
    /// Only setup failures (client construction, zone lookup) are returned
    /// as errors; per-family failures are recorded in the report.
    pub async fn tick(&mut self) -> Result<TickReport> {
        let (provider, zone_id) = self
            .session
            .prepare(self.provider_factory.as_ref(), &self.config)
            .await?;
        let record_name = self.config.record_name();

        let a = if self.config.update_a {
            sync_family(provider, zone_id, self.ipv4_source.as_ref(), &record_name).await
        } else {
            trace!("Not updating A record as DONT_UPDATE_A is set");
            FamilyOutcome::Skipped
        };

        let aaaa = if self.config.update_aaaa {
            sync_family(provider, zone_id, self.ipv6_source.as_ref(), &record_name).await
        } else {
            trace!("Not updating AAAA record as DONT_UPDATE_AAAA is set");
            FamilyOutcome::Skipped
        };

        Ok(TickReport { a, aaaa })
    }
}

/// Resolve and reconcile one family, containing any failure
async fn sync_family(
    provider: &dyn DnsProvider,
    zone_id: &str,
    source: &dyn IpSource,
    record_name: &str,
) -> FamilyOutcome {
    let version = source.version();
    let record_type = version.record_type();

    let address: IpAddr = match resolver::resolve(source).await {
        Ok(address) => address,
        Err(e) => {
            error!("{}", e);
            return FamilyOutcome::Failed(e.to_string());
        }
    };
    trace!("External {} address is {}", version, address);

    let selector = RecordSelector::new(record_name, record_type);
    match reconcile(provider, zone_id, &selector, address).await {
        Ok(result) => {
            match &result {
                UpdateResult::Created { new_ip } => {
                    trace!("{} record created successfully ({})", record_type, new_ip)
                }
                UpdateResult::Updated {
                    previous_content,
                    new_ip,
                } => trace!(
                    "{} record updated successfully ({} -> {})",
                    record_type, previous_content, new_ip
                ),
                UpdateResult::Unchanged { current_ip } => {
                    trace!("{} record unchanged ({})", record_type, current_ip)
                }
            }
            FamilyOutcome::Succeeded(result)
        }
        Err(e) => {
            error!("Unable to reconcile {} record for {}: {}", record_type, record_name, e);
            FamilyOutcome::Failed(e.to_string())
        }
    }
}
