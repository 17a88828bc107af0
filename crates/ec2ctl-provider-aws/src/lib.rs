// # AWS Providers
//
// EC2 compute and Route53 DNS implementations of the ec2ctl-core traits.
//
// ## Architectural Constraints
//
// - One API call per trait method: no retries, no sleeping, no polling
//   (waiting is owned by `CommandEngine`)
// - Probe failures are reported as `StateProbe::ProbeFailed`, never raised
// - Route53 failures are classified into `DnsErrorKind`
//
// ## Session
//
// Both clients share one `SdkConfig`, loaded from ambient credentials
// (environment, profile, instance metadata) and the fixed region.
//
// ## API Reference
//
// - EC2: DescribeInstanceStatus, DescribeInstances, StartInstances, StopInstances
// - Route53: ChangeResourceRecordSets

mod ec2;
mod route53;

pub use ec2::Ec2Compute;
pub use route53::Route53Dns;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use ec2ctl_core::{CommandSettings, Providers, Result};

/// Load the shared AWS session for the configured region
pub async fn load_session(settings: &CommandSettings) -> SdkConfig {
    tracing::debug!("Loading AWS session for region {}", settings.region);
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .load()
        .await
}

/// Whether the DNS provider should only log changes
///
/// Enabled by `EC2CTL_MODE=dry-run`.
pub fn dry_run_from_env() -> bool {
    std::env::var("EC2CTL_MODE")
        .unwrap_or_default()
        .eq_ignore_ascii_case("dry-run")
}

/// Open a session and build both providers
pub async fn connect(settings: CommandSettings) -> Result<Providers> {
    let session = load_session(&settings).await;

    let dry_run = dry_run_from_env();
    if dry_run {
        tracing::warn!("Route53 provider running in DRY-RUN mode - no records will be changed");
    }

    Ok(Providers {
        compute: Box::new(Ec2Compute::new(
            aws_sdk_ec2::Client::new(&session),
            settings.availability_zone.clone(),
        )),
        dns: Box::new(Route53Dns::new(aws_sdk_route53::Client::new(&session), dry_run)),
    })
}
