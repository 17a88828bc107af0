//! Error types for ec2ctl
//!
//! This module defines all error types used throughout the crate.

use crate::state::InstanceState;
use thiserror::Error;

/// Result type alias for ec2ctl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Known failure codes of the DNS change API
///
/// Anything the provider reports outside this set is classified as
/// [`DnsErrorKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsErrorKind {
    /// The hosted zone does not exist
    NoSuchHostedZone,
    /// A health check referenced by the change does not exist
    NoSuchHealthCheck,
    /// The change batch was rejected
    InvalidChangeBatch,
    /// The request input was rejected
    InvalidInput,
    /// An earlier change to the same zone is still propagating
    PriorRequestNotComplete,
    /// Any other failure (network, auth, throttling, ...)
    Other,
}

impl DnsErrorKind {
    /// Classify a provider error code
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("NoSuchHostedZone") => Self::NoSuchHostedZone,
            Some("NoSuchHealthCheck") => Self::NoSuchHealthCheck,
            Some("InvalidChangeBatch") => Self::InvalidChangeBatch,
            Some("InvalidInput") => Self::InvalidInput,
            Some("PriorRequestNotComplete") => Self::PriorRequestNotComplete,
            _ => Self::Other,
        }
    }

    /// The provider error code, if this is a known one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::NoSuchHostedZone => Some("NoSuchHostedZone"),
            Self::NoSuchHealthCheck => Some("NoSuchHealthCheck"),
            Self::InvalidChangeBatch => Some("InvalidChangeBatch"),
            Self::InvalidInput => Some("InvalidInput"),
            Self::PriorRequestNotComplete => Some("PriorRequestNotComplete"),
            Self::Other => None,
        }
    }

    /// Human-readable hint for the operator
    pub fn hint(&self) -> &'static str {
        match self {
            Self::NoSuchHostedZone => "check DomainZoneID in the configuration file",
            Self::NoSuchHealthCheck => "the record references a health check that does not exist",
            Self::InvalidChangeBatch => "the record change was rejected by the DNS service",
            Self::InvalidInput => "the DNS service rejected the request parameters",
            Self::PriorRequestNotComplete => "a previous change is still in progress, try again shortly",
            Self::Other => "unexpected DNS service failure",
        }
    }
}

/// Core error type for ec2ctl
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Compute provider call failed
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Instance or address not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The instance is in a state the command cannot work from
    #[error("Invalid instance state: {0}")]
    InvalidState(String),

    /// Polling gave up before the instance reached the target state
    #[error("Timed out waiting for state {target} after {attempts} probe(s)")]
    Timeout {
        /// State the poll was waiting for
        target: InstanceState,
        /// Number of probes issued
        attempts: usize,
    },

    /// DNS change was rejected or could not be submitted
    #[error("{}", dns_message(.kind, .message))]
    Dns {
        /// Classified failure code
        kind: DnsErrorKind,
        /// Provider message
        message: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn dns_message(kind: &DnsErrorKind, message: &str) -> String {
    match kind.code() {
        Some(code) => format!("DNS update failed: {} {} ({})", code, message, kind.hint()),
        None => format!("DNS update failed: {}", message),
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a DNS error
    pub fn dns(kind: DnsErrorKind, message: impl Into<String>) -> Self {
        Self::Dns {
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error came from loading or validating configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Io(_) | Self::Json(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
