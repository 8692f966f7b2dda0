//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record every remote call
//! so tests can assert on call counts without any network access.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, IpSource, IpVersion, ProviderCredentials,
    RecordSelector, RecordType,
};
use ddns_core::{DdnsConfig, DdnsEngine};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Zone ID handed out by [`MockDnsProvider`]
pub const ZONE_ID: &str = "zone-123";

/// Zone name used by [`test_config`]
pub const ZONE_NAME: &str = "example.com";

/// Record name produced by [`test_config`]
pub const RECORD_NAME: &str = "home.example.com";

/// One scripted answer from an echo endpoint
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with this body
    Body(&'static str),
    /// Fail the request at the transport level
    Transport,
}

/// An IpSource that replays a script of replies
///
/// Once the script is exhausted the last reply repeats forever.
pub struct ScriptedIpSource {
    version: IpVersion,
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Reply>,
    /// Call counter for query()
    calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(version: IpVersion, script: Vec<Reply>) -> Self {
        let last = script.last().cloned().unwrap_or(Reply::Transport);
        Self {
            version,
            script: Mutex::new(script.into()),
            last: Mutex::new(last),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always answers with `body`
    pub fn answering(version: IpVersion, body: &'static str) -> Self {
        Self::new(version, vec![Reply::Body(body)])
    }

    /// A source whose every request fails
    pub fn unreachable(version: IpVersion) -> Self {
        Self::new(version, vec![Reply::Transport])
    }

    /// Handle to the call counter that survives boxing the source
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn query(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = match self.script.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => self.last.lock().unwrap().clone(),
        };

        match reply {
            Reply::Body(body) => Ok(body.to_string()),
            Reply::Transport => Err(Error::ip_source("connection refused")),
        }
    }

    fn version(&self) -> IpVersion {
        self.version
    }

    fn source_name(&self) -> &str {
        "scripted"
    }
}

/// Read a shared call counter
pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Everything the mock provider has seen and holds
#[derive(Debug, Default)]
pub struct ProviderState {
    /// Records currently "published"
    pub records: Vec<DnsRecord>,
    /// Number of zone_id() calls
    pub zone_lookups: usize,
    /// Types passed to list_records(), in call order
    pub list_calls: Vec<RecordType>,
    /// (type, content) passed to create_record(), in call order
    pub create_calls: Vec<(RecordType, String)>,
    /// (record_id, content) passed to update_record(), in call order
    pub update_calls: Vec<(String, String)>,
    /// Record types whose every call fails
    pub failing_types: Vec<RecordType>,
    /// zone_id() reports the zone as missing
    pub zone_missing: bool,
    next_id: usize,
}

impl ProviderState {
    pub fn write_count(&self) -> usize {
        self.create_calls.len() + self.update_calls.len()
    }

    fn check(&self, record_type: RecordType) -> Result<()> {
        if self.failing_types.contains(&record_type) {
            return Err(Error::provider("mock", format!("{} calls are failing", record_type)));
        }
        Ok(())
    }
}

/// An in-memory DnsProvider
///
/// Clones share state, so a test can keep one handle and give the engine
/// another.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record
    pub fn with_record(self, id: &str, record_type: RecordType, content: &str) -> Self {
        self.state().records.push(DnsRecord {
            id: id.to_string(),
            name: RECORD_NAME.to_string(),
            record_type,
            content: content.to_string(),
        });
        self
    }

    /// Make every call for this record type fail
    pub fn failing_for(self, record_type: RecordType) -> Self {
        self.state().failing_types.push(record_type);
        self
    }

    /// Make the zone lookup fail
    pub fn without_zone(self) -> Self {
        self.state().zone_missing = true;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        let mut state = self.state();
        state.zone_lookups += 1;
        if state.zone_missing {
            return Err(Error::not_found(format!("Zone not found: {}", zone_name)));
        }
        Ok(ZONE_ID.to_string())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        selector: &RecordSelector,
    ) -> Result<Vec<DnsRecord>> {
        assert_eq!(zone_id, ZONE_ID);
        let mut state = self.state();
        state.list_calls.push(selector.record_type);
        state.check(selector.record_type)?;

        Ok(state
            .records
            .iter()
            .filter(|r| r.name == selector.name && r.record_type == selector.record_type)
            .cloned()
            .collect())
    }

    async fn create_record(
        &self,
        zone_id: &str,
        selector: &RecordSelector,
        content: &str,
    ) -> Result<()> {
        assert_eq!(zone_id, ZONE_ID);
        let mut state = self.state();
        state
            .create_calls
            .push((selector.record_type, content.to_string()));
        state.check(selector.record_type)?;

        state.next_id += 1;
        let id = format!("rec-{}", state.next_id);
        state.records.push(DnsRecord {
            id,
            name: selector.name.clone(),
            record_type: selector.record_type,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        selector: &RecordSelector,
        content: &str,
    ) -> Result<()> {
        assert_eq!(zone_id, ZONE_ID);
        let mut state = self.state();
        state
            .update_calls
            .push((record_id.to_string(), content.to_string()));
        state.check(selector.record_type)?;

        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("No record {}", record_id)))?;
        record.content = content.to_string();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A factory handing out clones of one MockDnsProvider
#[derive(Clone)]
pub struct MockProviderFactory {
    provider: MockDnsProvider,
    fail: bool,
    /// Call counter for create()
    creates: Arc<AtomicUsize>,
}

impl MockProviderFactory {
    pub fn new(provider: MockDnsProvider) -> Self {
        Self {
            provider,
            fail: false,
            creates: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A factory whose client construction always fails
    pub fn broken() -> Self {
        Self {
            fail: true,
            ..Self::new(MockDnsProvider::new())
        }
    }

    pub fn create_count(&self) -> usize {
        count(&self.creates)
    }
}

impl DnsProviderFactory for MockProviderFactory {
    fn create(
        &self,
        _credentials: &ProviderCredentials,
        _http_timeout: Duration,
    ) -> Result<Box<dyn DnsProvider>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::auth("invalid credentials"));
        }
        Ok(Box::new(self.provider.clone()))
    }
}

/// Minimal configuration: both families on, looping every 5 minutes
pub fn test_config() -> DdnsConfig {
    DdnsConfig::new(
        ProviderCredentials {
            api_key: "test-key".to_string(),
            email: "ops@example.com".to_string(),
        },
        ZONE_NAME,
        "home",
    )
}

/// Build an engine from test doubles
pub fn engine(
    config: DdnsConfig,
    factory: &MockProviderFactory,
    ipv4: ScriptedIpSource,
    ipv6: ScriptedIpSource,
) -> DdnsEngine {
    DdnsEngine::new(config, Box::new(factory.clone()), Box::new(ipv4), Box::new(ipv6))
        .expect("engine construction succeeds")
}
