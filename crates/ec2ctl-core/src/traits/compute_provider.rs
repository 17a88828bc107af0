// # Compute Provider Trait
//
// Defines the interface for inspecting and changing the power state of one
// instance.
//
// ## Implementations
//
// - EC2: `ec2ctl-provider-aws` crate
//
// ## Usage
//
// ```rust,ignore
// use ec2ctl_core::{ComputeProvider, StateProbe};
//
// let compute = /* ComputeProvider implementation */;
// if let StateProbe::Known(state) = compute.instance_state("i-0abc123").await {
//     println!("instance is {state}");
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::state::StateProbe;

/// Trait for compute provider implementations
///
/// Every method is a single-shot call. Waiting for a transition and retrying
/// probes is owned by [`crate::CommandEngine`]; providers must not sleep or
/// loop.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Probe the current lifecycle state of an instance
    ///
    /// Provider failures are reported as [`StateProbe::ProbeFailed`], never
    /// as an error, so the caller can decide whether to retry.
    async fn instance_state(&self, instance_id: &str) -> StateProbe;

    /// Look up the public IPv4 address of an instance
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The instance's public address
    /// - `Err(Error::NotFound)`: No such instance, or it has no public address
    /// - `Err(Error::Provider)`: The lookup call failed
    async fn public_address(&self, instance_id: &str) -> Result<Ipv4Addr, crate::Error>;

    /// Request a start transition
    async fn start_instance(&self, instance_id: &str) -> Result<(), crate::Error>;

    /// Request a stop transition
    async fn stop_instance(&self, instance_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
