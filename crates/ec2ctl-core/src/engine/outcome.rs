//! Command outcomes and process exit status

use crate::error::Error;
use crate::state::InstanceState;
use std::fmt;
use std::net::Ipv4Addr;

/// Result of the DNS step of a start
#[derive(Debug)]
pub enum DnsUpdate {
    /// The record change was submitted
    Applied { hostname: String, address: Ipv4Addr },
    /// The record change was only logged
    DryRun { hostname: String, address: Ipv4Addr },
    /// The record change failed; the instance is still running
    Failed(Error),
}

/// Terminal outcome of a command
#[derive(Debug)]
pub enum Outcome {
    /// `status`: current state, with the address when running
    Status {
        state: InstanceState,
        address: Option<Ipv4Addr>,
    },
    /// `start` on a running instance: nothing was changed
    AlreadyRunning { address: Option<Ipv4Addr> },
    /// `start` brought the instance up
    Started { address: Ipv4Addr, dns: DnsUpdate },
    /// `stop` on an instance that is not running: nothing was changed
    NotRunning { state: InstanceState },
    /// `stop` brought the instance down
    Stopped,
}

impl Outcome {
    /// Exit status for this outcome
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Outcome::Started {
                dns: DnsUpdate::Failed(_),
                ..
            } => ExitStatus::DnsError,
            _ => ExitStatus::Success,
        }
    }
}

fn describe_address(address: &Option<Ipv4Addr>) -> String {
    match address {
        Some(address) => format!("current IP = {}", address),
        None => "current IP unavailable".to_string(),
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Status {
                state: InstanceState::Running,
                address,
            } => write!(f, "Instance is running, {}.", describe_address(address)),
            Outcome::Status { state, .. } => write!(f, "Instance is {}.", state),
            Outcome::AlreadyRunning { address } => write!(
                f,
                "Instance is running, {}. Nothing to do.",
                describe_address(address)
            ),
            Outcome::Started { address, dns } => {
                write!(f, "Instance has been started, address = {}. ", address)?;
                match dns {
                    DnsUpdate::Applied { hostname, address } => {
                        write!(f, "Record {} updated to {}.", hostname, address)
                    }
                    DnsUpdate::DryRun { hostname, address } => {
                        write!(f, "Record {} would be updated to {} (dry-run).", hostname, address)
                    }
                    DnsUpdate::Failed(e) => write!(f, "{}", e),
                }
            }
            Outcome::NotRunning { state } => {
                write!(f, "Instance is not running ({}). Nothing to do.", state)
            }
            Outcome::Stopped => f.write_str("Instance has been stopped."),
        }
    }
}

/// Process exit codes
///
/// - 0: Success, including commands that had nothing to do
/// - 1: Configuration or command-line error
/// - 2: Provider error (probe, transition, lookup, not found, bad state)
/// - 3: DNS update failed after a successful start
/// - 4: Timed out waiting for a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    ConfigError = 1,
    ProviderError = 2,
    DnsError = 3,
    Timeout = 4,
}

impl ExitStatus {
    /// Exit status for a command that failed with `err`
    pub fn from_error(err: &Error) -> Self {
        match err {
            e if e.is_config() => ExitStatus::ConfigError,
            Error::Timeout { .. } => ExitStatus::Timeout,
            Error::Dns { .. } => ExitStatus::DnsError,
            _ => ExitStatus::ProviderError,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}
