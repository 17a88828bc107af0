//! Instance lifecycle states and probe results

use std::fmt;

/// Lifecycle state reported by the compute provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    /// A state name this tool does not recognise
    Other(String),
}

impl InstanceState {
    /// Provider name of the state (e.g. "running")
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Other(name) => name.as_str(),
        }
    }

    /// States from which the instance can never come back
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShuttingDown | Self::Terminated)
    }
}

impl From<&str> for InstanceState {
    fn from(name: &str) -> Self {
        match name {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single state probe
///
/// Probe failures are values, not errors: the polling loop treats them as
/// "not there yet" and keeps going, while the entry probe of a command turns
/// them into an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateProbe {
    /// The provider reported a state for the instance
    Known(InstanceState),
    /// The provider call itself failed (network, auth, API error)
    ProbeFailed(String),
    /// The call succeeded but no record matched the instance id
    NoMatchingInstance,
}

impl StateProbe {
    /// Whether this probe observed exactly `target`
    pub fn is(&self, target: &InstanceState) -> bool {
        matches!(self, Self::Known(state) if state == target)
    }
}

impl fmt::Display for StateProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(state) => write!(f, "{}", state),
            Self::ProbeFailed(cause) => write!(f, "probe failed ({})", cause),
            Self::NoMatchingInstance => f.write_str("unknown state"),
        }
    }
}
