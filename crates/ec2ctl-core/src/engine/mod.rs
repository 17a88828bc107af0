//! Command engine
//!
//! The CommandEngine is responsible for:
//! - Probing the instance state at the start of every command
//! - Issuing at most one lifecycle transition per command
//! - Waiting for the transition with a bounded poll loop
//! - Pointing the DNS record at the new address after a start
//!
//! ## Flow
//!
//! ```text
//!             ┌──────────────┐
//!             │  probe state │
//!             └──────┬───────┘
//!     status         │ start                  stop
//!   ┌────────────────┼──────────────────────────┐
//!   ▼                ▼                          ▼
//! address?    stopped → start request     running → stop request
//!                    │                          │
//!             wait for running            wait for stopped
//!                    │
//!              address → DNS upsert
//! ```

mod outcome;

pub use outcome::{DnsUpdate, ExitStatus, Outcome};

use crate::config::{CommandSettings, InstanceConfig};
use crate::error::{Error, Result};
use crate::state::{InstanceState, StateProbe};
use crate::traits::{ComputeProvider, DnsProvider, RecordChange};
use std::fmt;
use std::future::Future;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// Operation requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Report state (and address when running)
    #[default]
    Status,
    /// Ensure the instance runs and its record points at it
    Start,
    /// Ensure the instance is stopped
    Stop,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::Start => "start",
            Command::Stop => "stop",
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" => Ok(Command::Status),
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            other => Err(Error::invalid_input(format!(
                "unknown command '{}', expected one of: status, start, stop",
                other
            ))),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider implementations for one session
pub struct Providers {
    pub compute: Box<dyn ComputeProvider>,
    pub dns: Box<dyn DnsProvider>,
}

/// Load the configuration, open a session and execute one command
///
/// `connect` is only called once the configuration loaded and validated, so
/// a broken configuration file never reaches the provider.
pub async fn run_from_file<F, Fut>(
    config_path: &Path,
    command: Command,
    settings: CommandSettings,
    connect: F,
) -> Result<Outcome>
where
    F: FnOnce(CommandSettings) -> Fut,
    Fut: Future<Output = Result<Providers>>,
{
    let config = InstanceConfig::from_file(config_path)?;
    settings.validate()?;

    let providers = connect(settings.clone()).await?;
    info!("Session established.");

    let engine = CommandEngine::new(providers.compute, providers.dns, config, settings)?;
    engine.execute(command).await
}

/// Executes one command against one instance
pub struct CommandEngine {
    /// Compute provider for probing and transitions
    compute: Box<dyn ComputeProvider>,

    /// DNS provider for the record update
    dns: Box<dyn DnsProvider>,

    /// Instance and zone identifiers
    config: InstanceConfig,

    /// Fixed operational settings
    settings: CommandSettings,
}

impl CommandEngine {
    /// Create a new engine
    ///
    /// Fails if the configuration or settings are invalid.
    pub fn new(
        compute: Box<dyn ComputeProvider>,
        dns: Box<dyn DnsProvider>,
        config: InstanceConfig,
        settings: CommandSettings,
    ) -> Result<Self> {
        config.validate()?;
        settings.validate()?;

        Ok(Self {
            compute,
            dns,
            config,
            settings,
        })
    }

    /// Execute a command
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: The command reached a terminal outcome. A failed DNS
    ///   update after a successful start is reported inside the outcome.
    /// - `Err(Error)`: The command could not complete
    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        let instance_id = &self.config.instance_id;
        debug!("Executing {} for instance {}", command, instance_id);

        let probe = self.compute.instance_state(instance_id).await;
        info!("Current state is {}", probe);
        let state = self.entry_state(probe)?;

        match command {
            Command::Status => self.status(state).await,
            Command::Start => self.start(state).await,
            Command::Stop => self.stop(state).await,
        }
    }

    /// Turn the entry probe into a known state, or fail the command
    fn entry_state(&self, probe: StateProbe) -> Result<InstanceState> {
        match probe {
            StateProbe::Known(state) => Ok(state),
            StateProbe::ProbeFailed(cause) => Err(Error::provider(
                self.compute.provider_name(),
                format!("Error on receiving status of instance: {}", cause),
            )),
            StateProbe::NoMatchingInstance => Err(Error::not_found(format!(
                "instance {} not found",
                self.config.instance_id
            ))),
        }
    }

    async fn status(&self, state: InstanceState) -> Result<Outcome> {
        let address = if state == InstanceState::Running {
            self.lookup_address_lenient().await
        } else {
            None
        };

        Ok(Outcome::Status { state, address })
    }

    async fn start(&self, state: InstanceState) -> Result<Outcome> {
        let instance_id = &self.config.instance_id;

        match state {
            InstanceState::Running => {
                let address = self.lookup_address_lenient().await;
                return Ok(Outcome::AlreadyRunning { address });
            }
            InstanceState::Stopped => {
                self.request_start().await?;
            }
            InstanceState::Pending => {
                info!("Instance is already starting, waiting for it");
            }
            InstanceState::Stopping => {
                info!("Instance is stopping, waiting for it to stop before starting");
                self.wait_for_state(&InstanceState::Stopped).await?;
                self.request_start().await?;
            }
            other => {
                return Err(Error::invalid_state(format!(
                    "instance {} is {} and cannot be started",
                    instance_id, other
                )));
            }
        }

        self.wait_for_state(&InstanceState::Running).await?;
        info!("Instance has been started");

        let address = self.compute.public_address(instance_id).await?;
        info!("Instance address = {}", address);

        let dns = self.update_dns(address).await;
        Ok(Outcome::Started { address, dns })
    }

    async fn stop(&self, state: InstanceState) -> Result<Outcome> {
        if state != InstanceState::Running {
            info!("Instance is not running, nothing to stop");
            return Ok(Outcome::NotRunning { state });
        }

        info!("Trying to stop instance");
        self.compute.stop_instance(&self.config.instance_id).await?;

        self.wait_for_state(&InstanceState::Stopped).await?;
        info!("Instance has been stopped");

        Ok(Outcome::Stopped)
    }

    async fn request_start(&self) -> Result<()> {
        info!("Trying to start instance");
        self.compute.start_instance(&self.config.instance_id).await
    }

    /// Poll until the instance reports `target`
    ///
    /// Probes at most `max_poll_attempts` times, sleeping `poll_interval`
    /// between probes. Failed or unmatched probes never satisfy the target;
    /// they are logged and polling continues.
    ///
    /// # Returns
    ///
    /// - `Ok(n)`: The number of probes it took to observe `target`
    /// - `Err(Error::InvalidState)`: The instance entered a terminal state
    /// - `Err(Error::Timeout)`: `target` was not observed in time
    pub async fn wait_for_state(&self, target: &InstanceState) -> Result<usize> {
        let max_attempts = self.settings.max_poll_attempts;

        for attempt in 1..=max_attempts {
            let probe = self.compute.instance_state(&self.config.instance_id).await;

            match &probe {
                StateProbe::Known(state) if state == target => {
                    debug!("Reached {} after {} probe(s)", target, attempt);
                    return Ok(attempt);
                }
                StateProbe::Known(state) if state.is_terminal() => {
                    error!("Instance entered {} while waiting for {}", state, target);
                    return Err(Error::invalid_state(format!(
                        "instance {} is {} while waiting for {}",
                        self.config.instance_id, state, target
                    )));
                }
                StateProbe::Known(state) => {
                    info!("Current status = {}, waiting...", state);
                }
                StateProbe::ProbeFailed(cause) => {
                    warn!("State probe {} failed: {}", attempt, cause);
                }
                StateProbe::NoMatchingInstance => {
                    warn!("State probe {} returned no matching instance", attempt);
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.settings.poll_interval).await;
            }
        }

        Err(Error::Timeout {
            target: target.clone(),
            attempts: max_attempts,
        })
    }

    /// Address lookup for reporting only: failures are logged, not raised
    async fn lookup_address_lenient(&self) -> Option<Ipv4Addr> {
        match self.compute.public_address(&self.config.instance_id).await {
            Ok(address) => Some(address),
            Err(e) => {
                warn!("Could not look up public address: {}", e);
                None
            }
        }
    }

    /// Point the managed record at `address`
    async fn update_dns(&self, address: Ipv4Addr) -> DnsUpdate {
        let change = RecordChange::upsert_a(
            self.config.zone_id.clone(),
            self.settings.hostname.clone(),
            address,
            self.settings.record_ttl,
            self.settings.record_comment.clone(),
        );
        debug!("Submitting {} via {}", change, self.dns.provider_name());

        match self.dns.upsert_record(&change).await {
            Ok(true) => {
                info!("Record in domain updated to {}", address);
                DnsUpdate::Applied {
                    hostname: change.name,
                    address,
                }
            }
            Ok(false) => DnsUpdate::DryRun {
                hostname: change.name,
                address,
            },
            Err(e) => {
                error!("{}", e);
                DnsUpdate::Failed(e)
            }
        }
    }

    /// The configuration this engine runs with
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }
}
