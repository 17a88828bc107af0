//! Contract Test: `start` Command
//!
//! Constraints verified:
//! - A running instance is left alone (no start request, no DNS change)
//! - A stopped instance gets exactly one start request, then the engine
//!   polls until it runs and points the record at the new address
//! - The DNS request is a single-value UPSERT of an A record
//! - A failed DNS step does not undo the start but changes the exit status

mod common;

use common::*;
use ec2ctl_core::traits::{ChangeAction, RecordType};
use ec2ctl_core::{DnsErrorKind, DnsUpdate, Error, ExitStatus, InstanceState, Outcome};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn start_on_running_instance_is_a_no_op() {
    let compute = ScriptedCompute::states(&[InstanceState::Running]);
    let dns = RecordingDns::new();
    let engine = engine_with(&compute, &dns, fast_settings(10));

    let outcome = assert_ok!(engine.execute(ec2ctl_core::Command::Start).await);

    match outcome {
        Outcome::AlreadyRunning { address } => assert_eq!(address, Some(public_ip())),
        other => panic!("expected AlreadyRunning, got {:?}", other),
    }
    assert_eq!(compute.start_count(), 0, "no start request for a running instance");
    assert_eq!(compute.probe_count(), 1, "only the entry probe");
    assert!(dns.changes().is_empty(), "DNS must not be touched");
}

async fn converge_after_pending_probes(pending: usize) {
    let mut script = vec![InstanceState::Stopped];
    script.extend(std::iter::repeat_n(InstanceState::Pending, pending));
    script.push(InstanceState::Running);

    let compute = ScriptedCompute::states(&script);
    let dns = RecordingDns::new();
    let engine = engine_with(&compute, &dns, fast_settings(10));

    let outcome = assert_ok!(engine.execute(ec2ctl_core::Command::Start).await);

    assert_eq!(compute.start_count(), 1, "exactly one start request");
    assert_eq!(
        compute.probe_count(),
        pending + 2,
        "entry probe, {} pending probe(s), one running probe",
        pending
    );
    assert_eq!(compute.address_count(), 1);
    assert_eq!(dns.changes().len(), 1, "exactly one DNS change");

    match outcome {
        Outcome::Started {
            address,
            dns: DnsUpdate::Applied { .. },
        } => assert_eq!(address, public_ip()),
        other => panic!("expected Started with applied DNS, got {:?}", other),
    }
}

#[tokio::test]
async fn start_converges_when_running_on_first_poll() {
    converge_after_pending_probes(0).await;
}

#[tokio::test]
async fn start_converges_after_three_pending_polls() {
    converge_after_pending_probes(3).await;
}

#[tokio::test]
async fn dns_request_has_the_expected_shape() {
    let compute = ScriptedCompute::states(&[InstanceState::Stopped, InstanceState::Running]);
    let dns = RecordingDns::new();
    let settings = fast_settings(10);
    let hostname = settings.hostname.clone();
    let engine = engine_with(&compute, &dns, settings);

    assert_ok!(engine.execute(ec2ctl_core::Command::Start).await);

    let changes = dns.changes();
    assert_eq!(changes.len(), 1);
    let change = &changes[0];
    assert_eq!(change.zone_id, ZONE_ID);
    assert_eq!(change.action, ChangeAction::Upsert);
    assert_eq!(change.record_type, RecordType::A);
    assert_eq!(change.ttl, 900);
    assert_eq!(change.name, hostname);
    assert_eq!(change.values, vec![public_ip()]);
}

#[tokio::test]
async fn pending_instance_is_awaited_without_a_start_request() {
    let compute = ScriptedCompute::states(&[
        InstanceState::Pending,
        InstanceState::Pending,
        InstanceState::Running,
    ]);
    let dns = RecordingDns::new();
    let engine = engine_with(&compute, &dns, fast_settings(10));

    let outcome = assert_ok!(engine.execute(ec2ctl_core::Command::Start).await);

    assert_eq!(compute.start_count(), 0);
    assert!(matches!(outcome, Outcome::Started { .. }));
    assert_eq!(dns.changes().len(), 1, "DNS follows the new address");
}

#[tokio::test]
async fn stopping_instance_is_started_once_it_has_stopped() {
    let compute = ScriptedCompute::states(&[
        InstanceState::Stopping,
        InstanceState::Stopping,
        InstanceState::Stopped,
        InstanceState::Pending,
        InstanceState::Running,
    ]);
    let dns = RecordingDns::new();
    let engine = engine_with(&compute, &dns, fast_settings(10));

    let outcome = assert_ok!(engine.execute(ec2ctl_core::Command::Start).await);

    assert_eq!(compute.start_count(), 1);
    assert_eq!(compute.probe_count(), 5);
    assert!(matches!(outcome, Outcome::Started { .. }));
}

#[tokio::test]
async fn terminated_instance_cannot_be_started() {
    let compute = ScriptedCompute::states(&[InstanceState::Terminated]);
    let dns = RecordingDns::new();
    let engine = engine_with(&compute, &dns, fast_settings(10));

    let err = assert_err!(engine.execute(ec2ctl_core::Command::Start).await);

    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(ExitStatus::from_error(&err), ExitStatus::ProviderError);
    assert_eq!(compute.start_count(), 0);
}

#[tokio::test]
async fn missing_address_skips_dns_update() {
    let compute =
        ScriptedCompute::states(&[InstanceState::Stopped, InstanceState::Running]).without_address();
    let dns = RecordingDns::new();
    let engine = engine_with(&compute, &dns, fast_settings(10));

    let err = assert_err!(engine.execute(ec2ctl_core::Command::Start).await);

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(compute.start_count(), 1);
    assert!(dns.changes().is_empty(), "no DNS change without an address");
}

#[tokio::test]
async fn rejected_dns_change_is_reported_with_its_code() {
    let compute = ScriptedCompute::states(&[InstanceState::Stopped, InstanceState::Running]);
    let dns = RecordingDns::failing(DnsErrorKind::NoSuchHostedZone);
    let engine = engine_with(&compute, &dns, fast_settings(10));

    let outcome = assert_ok!(engine.execute(ec2ctl_core::Command::Start).await);

    assert_eq!(dns.changes().len(), 1, "submitted once, never retried");
    assert_eq!(outcome.exit_status(), ExitStatus::DnsError);
    match &outcome {
        Outcome::Started {
            dns: DnsUpdate::Failed(Error::Dns { kind, .. }),
            ..
        } => assert_eq!(*kind, DnsErrorKind::NoSuchHostedZone),
        other => panic!("expected failed DNS update, got {:?}", other),
    }
    assert!(outcome.to_string().contains("NoSuchHostedZone"));
}
