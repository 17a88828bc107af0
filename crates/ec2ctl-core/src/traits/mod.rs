//! Core traits for ec2ctl
//!
//! This module defines the abstract interfaces the provider crates implement.
//!
//! - [`ComputeProvider`]: Probe and change the instance lifecycle
//! - [`DnsProvider`]: Submit record changes to the DNS service

pub mod compute_provider;
pub mod dns_provider;

pub use compute_provider::ComputeProvider;
pub use dns_provider::{ChangeAction, DnsProvider, RecordChange, RecordType};
