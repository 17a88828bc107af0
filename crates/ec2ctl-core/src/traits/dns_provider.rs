// # DNS Provider Trait
//
// Defines the interface for submitting record changes to a DNS service.
//
// ## Implementations
//
// - Route53: `ec2ctl-provider-aws` crate
//
// ## Usage
//
// ```rust,ignore
// use ec2ctl_core::{DnsProvider, RecordChange};
//
// let dns = /* DnsProvider implementation */;
// let change = RecordChange::upsert_a("Z123ABC", "host.example.com", address, 900, "comment");
// dns.upsert_record(&change).await?;
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// Record type of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// IPv4 address record
    A,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

/// Action applied to the record set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Create the record set, or replace it if it exists
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

/// A single record change, built right before submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    /// Hosted zone the record lives in
    pub zone_id: String,
    /// Change action
    pub action: ChangeAction,
    /// Fully qualified record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: i64,
    /// Record values
    pub values: Vec<Ipv4Addr>,
    /// Comment attached to the change batch
    pub comment: String,
}

impl RecordChange {
    /// Build an upsert of one A record pointing `name` at `address`
    pub fn upsert_a(
        zone_id: impl Into<String>,
        name: impl Into<String>,
        address: Ipv4Addr,
        ttl: i64,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            action: ChangeAction::Upsert,
            name: name.into(),
            record_type: RecordType::A,
            ttl,
            values: vec![address],
            comment: comment.into(),
        }
    }
}

impl fmt::Display for RecordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(
            f,
            "{} {} {} ttl={} -> {} (zone {})",
            self.action.as_str(),
            self.record_type.as_str(),
            self.name,
            self.ttl,
            values.join(","),
            self.zone_id
        )
    }
}

/// Trait for DNS provider implementations
///
/// # Error Classification
///
/// Implementations map provider failures to
/// [`crate::Error::Dns`] with a [`crate::DnsErrorKind`], so callers can report
/// a code-specific message. They never retry.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Submit a record change
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The change was submitted
    /// - `Ok(false)`: The change was only logged (dry-run)
    /// - `Err(Error::Dns)`: The change was rejected or could not be sent
    async fn upsert_record(&self, change: &RecordChange) -> Result<bool, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
