//! Route53 DNS provider

use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::{BuildError, DisplayErrorContext};
use aws_sdk_route53::operation::change_resource_record_sets::ChangeResourceRecordSetsError;
use aws_sdk_route53::types::{
    Change, ChangeAction as AwsChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet,
    RrType,
};
use ec2ctl_core::traits::{ChangeAction, DnsProvider, RecordChange, RecordType};
use ec2ctl_core::{DnsErrorKind, Error, Result};

/// Route53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider builds the change batch and logs it,
/// but does not submit it.
#[derive(Debug)]
pub struct Route53Dns {
    client: Client,
    dry_run: bool,
}

impl Route53Dns {
    pub fn new(client: Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }
}

fn invalid_request(err: BuildError) -> Error {
    Error::dns(DnsErrorKind::InvalidInput, format!("could not build change batch: {}", err))
}

/// Translate a record change into a Route53 record set
fn record_set(change: &RecordChange) -> Result<ResourceRecordSet> {
    let rr_type = match change.record_type {
        RecordType::A => RrType::A,
    };

    let mut builder = ResourceRecordSet::builder()
        .name(change.name.clone())
        .r#type(rr_type)
        .ttl(change.ttl);
    for value in &change.values {
        builder = builder.resource_records(
            ResourceRecord::builder()
                .value(value.to_string())
                .build()
                .map_err(invalid_request)?,
        );
    }

    builder.build().map_err(invalid_request)
}

/// Translate a record change into a Route53 change batch
fn change_batch(change: &RecordChange) -> Result<ChangeBatch> {
    let action = match change.action {
        ChangeAction::Upsert => AwsChangeAction::Upsert,
    };

    let entry = Change::builder()
        .action(action)
        .resource_record_set(record_set(change)?)
        .build()
        .map_err(invalid_request)?;

    ChangeBatch::builder()
        .comment(change.comment.clone())
        .changes(entry)
        .build()
        .map_err(invalid_request)
}

/// Classify a ChangeResourceRecordSets failure
fn classify(err: &ChangeResourceRecordSetsError) -> DnsErrorKind {
    match err {
        ChangeResourceRecordSetsError::NoSuchHostedZone(_) => DnsErrorKind::NoSuchHostedZone,
        ChangeResourceRecordSetsError::NoSuchHealthCheck(_) => DnsErrorKind::NoSuchHealthCheck,
        ChangeResourceRecordSetsError::InvalidChangeBatch(_) => DnsErrorKind::InvalidChangeBatch,
        ChangeResourceRecordSetsError::InvalidInput(_) => DnsErrorKind::InvalidInput,
        ChangeResourceRecordSetsError::PriorRequestNotComplete(_) => {
            DnsErrorKind::PriorRequestNotComplete
        }
        _ => DnsErrorKind::Other,
    }
}

#[async_trait]
impl DnsProvider for Route53Dns {
    async fn upsert_record(&self, change: &RecordChange) -> Result<bool> {
        let batch = change_batch(change)?;

        tracing::info!(
            "{} {} [mode: {}]",
            if self.dry_run { "Would submit" } else { "Submitting" },
            change,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send ChangeResourceRecordSets for zone {} with payload: {}",
                change.zone_id,
                serde_json::json!({
                    "Action": change.action.as_str(),
                    "Name": change.name,
                    "Type": change.record_type.as_str(),
                    "TTL": change.ttl,
                    "Values": change.values.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
                    "Comment": change.comment,
                })
            );
            return Ok(false);
        }

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(change.zone_id.clone())
            .change_batch(batch)
            .send()
            .await
            .map_err(|err| {
                let kind = err
                    .as_service_error()
                    .map(classify)
                    .unwrap_or(DnsErrorKind::Other);
                Error::dns(kind, DisplayErrorContext(&err).to_string())
            })?;

        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}
