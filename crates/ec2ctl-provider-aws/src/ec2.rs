//! EC2 compute provider

use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ec2::types::{Filter, InstanceStatus, Reservation};
use ec2ctl_core::traits::ComputeProvider;
use ec2ctl_core::{Error, InstanceState, Result, StateProbe};
use std::net::Ipv4Addr;

const PROVIDER: &str = "ec2";

/// Error code EC2 returns for an instance id it does not know
const INSTANCE_NOT_FOUND_CODE: &str = "InvalidInstanceID.NotFound";

/// EC2 compute provider
///
/// Status queries are restricted to one availability zone and include
/// instances that are not running.
pub struct Ec2Compute {
    client: Client,
    availability_zone: String,
}

impl Ec2Compute {
    pub fn new(client: Client, availability_zone: impl Into<String>) -> Self {
        Self {
            client,
            availability_zone: availability_zone.into(),
        }
    }
}

/// Find the lifecycle state of `instance_id` among status records
fn state_from_statuses(statuses: &[InstanceStatus], instance_id: &str) -> StateProbe {
    statuses
        .iter()
        .find(|status| status.instance_id() == Some(instance_id))
        .map(|status| {
            match status.instance_state().and_then(|state| state.name()) {
                Some(name) => StateProbe::Known(InstanceState::from(name.as_str())),
                None => StateProbe::ProbeFailed("status record has no state name".to_string()),
            }
        })
        .unwrap_or(StateProbe::NoMatchingInstance)
}

/// Find the public address of `instance_id` among reservations
fn address_from_reservations(reservations: &[Reservation], instance_id: &str) -> Result<Ipv4Addr> {
    let instance = reservations
        .iter()
        .flat_map(|reservation| reservation.instances())
        .find(|instance| instance.instance_id() == Some(instance_id))
        .ok_or_else(|| Error::not_found(format!("instance {} not found", instance_id)))?;

    let raw = instance.public_ip_address().ok_or_else(|| {
        Error::not_found(format!("instance {} has no public address", instance_id))
    })?;

    raw.parse().map_err(|e| {
        Error::provider(PROVIDER, format!("invalid public address '{}': {}", raw, e))
    })
}

#[async_trait]
impl ComputeProvider for Ec2Compute {
    async fn instance_state(&self, instance_id: &str) -> StateProbe {
        tracing::debug!(
            "DescribeInstanceStatus {} (zone {})",
            instance_id,
            self.availability_zone
        );

        let filter = Filter::builder()
            .name("availability-zone")
            .values(self.availability_zone.clone())
            .build();

        let result = self
            .client
            .describe_instance_status()
            .filters(filter)
            .include_all_instances(true)
            .instance_ids(instance_id)
            .send()
            .await;

        match result {
            Ok(output) => state_from_statuses(output.instance_statuses(), instance_id),
            Err(err) => {
                let code = err.as_service_error().and_then(|e| e.code());
                if code == Some(INSTANCE_NOT_FOUND_CODE) {
                    return StateProbe::NoMatchingInstance;
                }
                StateProbe::ProbeFailed(DisplayErrorContext(&err).to_string())
            }
        }
    }

    async fn public_address(&self, instance_id: &str) -> Result<Ipv4Addr> {
        tracing::debug!("DescribeInstances {}", instance_id);

        let output = self
            .client
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|err| {
                let code = err.as_service_error().and_then(|e| e.code());
                if code == Some(INSTANCE_NOT_FOUND_CODE) {
                    Error::not_found(format!("instance {} not found", instance_id))
                } else {
                    Error::provider(PROVIDER, DisplayErrorContext(&err).to_string())
                }
            })?;

        address_from_reservations(output.reservations(), instance_id)
    }

    async fn start_instance(&self, instance_id: &str) -> Result<()> {
        tracing::debug!("StartInstances {}", instance_id);

        self.client
            .start_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|err| {
                Error::provider(
                    PROVIDER,
                    format!("start request failed: {}", DisplayErrorContext(&err)),
                )
            })?;
        Ok(())
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        tracing::debug!("StopInstances {}", instance_id);

        self.client
            .stop_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|err| {
                Error::provider(
                    PROVIDER,
                    format!("stop request failed: {}", DisplayErrorContext(&err)),
                )
            })?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
