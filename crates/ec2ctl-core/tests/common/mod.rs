//! Test doubles and common utilities for command contract tests
//!
//! The doubles record every call so tests can assert exactly which
//! provider requests a command issued.

#![allow(dead_code)]

use ec2ctl_core::error::{DnsErrorKind, Error, Result};
use ec2ctl_core::traits::{ComputeProvider, DnsProvider, RecordChange};
use ec2ctl_core::{CommandEngine, CommandSettings, InstanceConfig, InstanceState, StateProbe};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const INSTANCE_ID: &str = "i-abc123";
pub const ZONE_ID: &str = "Z123ABC";

pub fn public_ip() -> Ipv4Addr {
    Ipv4Addr::new(203, 0, 113, 5)
}

/// A compute provider that replays a scripted sequence of probes
///
/// Once the script runs out, the last probe repeats forever.
pub struct ScriptedCompute {
    /// Remaining probes
    script: Arc<Mutex<VecDeque<StateProbe>>>,
    /// Probe returned once the script is exhausted
    last: Arc<Mutex<StateProbe>>,
    /// Address returned by public_address(), None means "not found"
    address: Option<Ipv4Addr>,
    /// Call counter for instance_state()
    probe_count: Arc<AtomicUsize>,
    /// Call counter for start_instance()
    start_count: Arc<AtomicUsize>,
    /// Call counter for stop_instance()
    stop_count: Arc<AtomicUsize>,
    /// Call counter for public_address()
    address_count: Arc<AtomicUsize>,
}

impl ScriptedCompute {
    pub fn new(script: Vec<StateProbe>) -> Self {
        let last = script
            .last()
            .cloned()
            .unwrap_or(StateProbe::NoMatchingInstance);

        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(last)),
            address: Some(public_ip()),
            probe_count: Arc::new(AtomicUsize::new(0)),
            start_count: Arc::new(AtomicUsize::new(0)),
            stop_count: Arc::new(AtomicUsize::new(0)),
            address_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script from plain states
    pub fn states(states: &[InstanceState]) -> Self {
        Self::new(states.iter().cloned().map(StateProbe::Known).collect())
    }

    /// Make public_address() report "not found"
    pub fn without_address(mut self) -> Self {
        self.address = None;
        self
    }

    /// Create a new ScriptedCompute that shares script and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            address: other.address,
            probe_count: Arc::clone(&other.probe_count),
            start_count: Arc::clone(&other.start_count),
            stop_count: Arc::clone(&other.stop_count),
            address_count: Arc::clone(&other.address_count),
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probe_count.load(Ordering::SeqCst)
    }

    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }

    pub fn address_count(&self) -> usize {
        self.address_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ComputeProvider for ScriptedCompute {
    async fn instance_state(&self, instance_id: &str) -> StateProbe {
        assert_eq!(instance_id, INSTANCE_ID);
        self.probe_count.fetch_add(1, Ordering::SeqCst);

        match self.script.lock().unwrap().pop_front() {
            Some(probe) => probe,
            None => self.last.lock().unwrap().clone(),
        }
    }

    async fn public_address(&self, instance_id: &str) -> Result<Ipv4Addr> {
        assert_eq!(instance_id, INSTANCE_ID);
        self.address_count.fetch_add(1, Ordering::SeqCst);
        self.address
            .ok_or_else(|| Error::not_found("instance has no public address"))
    }

    async fn start_instance(&self, _instance_id: &str) -> Result<()> {
        self.start_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_instance(&self, _instance_id: &str) -> Result<()> {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A DNS provider that records submitted changes
pub struct RecordingDns {
    /// Submitted changes
    changes: Arc<Mutex<Vec<RecordChange>>>,
    /// Error kind to fail with, if any
    fail_with: Option<DnsErrorKind>,
}

impl RecordingDns {
    pub fn new() -> Self {
        Self {
            changes: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// A provider that rejects every change with `kind`
    pub fn failing(kind: DnsErrorKind) -> Self {
        Self {
            changes: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(kind),
        }
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            changes: Arc::clone(&other.changes),
            fail_with: other.fail_with,
        }
    }

    pub fn changes(&self) -> Vec<RecordChange> {
        self.changes.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for RecordingDns {
    async fn upsert_record(&self, change: &RecordChange) -> Result<bool> {
        self.changes.lock().unwrap().push(change.clone());
        match self.fail_with {
            Some(kind) => Err(Error::dns(kind, "rejected by test double")),
            None => Ok(true),
        }
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Settings with no delay between probes
pub fn fast_settings(max_poll_attempts: usize) -> CommandSettings {
    CommandSettings::default().with_polling(Duration::ZERO, max_poll_attempts)
}

/// Build an engine sharing counters with the given doubles
pub fn engine_with(
    compute: &ScriptedCompute,
    dns: &RecordingDns,
    settings: CommandSettings,
) -> CommandEngine {
    CommandEngine::new(
        Box::new(ScriptedCompute::sharing_counters_with(compute)),
        Box::new(RecordingDns::sharing_counters_with(dns)),
        InstanceConfig::new(INSTANCE_ID, ZONE_ID),
        settings,
    )
    .expect("engine construction succeeds")
}
