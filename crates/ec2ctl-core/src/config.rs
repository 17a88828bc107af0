//! Configuration types for ec2ctl
//!
//! Two kinds of configuration exist:
//! - [`InstanceConfig`]: the per-deployment identifiers read from a JSON file
//! - [`CommandSettings`]: fixed operational constants, compiled in

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "EC2Commands.json";

/// Region the session is opened in
pub const DEFAULT_REGION: &str = "us-east-2";

/// Availability zone used to filter status queries
pub const DEFAULT_AVAILABILITY_ZONE: &str = "us-east-2c";

/// Hostname whose A record follows the instance
pub const DEFAULT_HOSTNAME: &str = "proxy.vorotyntsev.name";

/// TTL of the A record, in seconds
pub const DEFAULT_RECORD_TTL: i64 = 900;

/// Comment attached to every record change
pub const DEFAULT_RECORD_COMMENT: &str = "Updated by ec2ctl on instance start";

/// Identifiers of the managed instance and its DNS zone
///
/// Loaded once at startup and passed explicitly to every component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// EC2 instance identifier (e.g. "i-0abc123")
    #[serde(rename = "EC2InstanceID")]
    pub instance_id: String,

    /// Route53 hosted zone identifier (e.g. "Z123ABC")
    #[serde(rename = "DomainZoneID")]
    pub zone_id: String,
}

impl InstanceConfig {
    /// Create a configuration from its two identifiers
    pub fn new(instance_id: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            zone_id: zone_id.into(),
        }
    }

    /// Load and validate the configuration file
    ///
    /// Fails if the file cannot be read, is not valid JSON, does not have
    /// both string fields, or either identifier is empty.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {}", path.display());

        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Decode and validate a configuration document
    pub fn from_json(raw: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.instance_id.trim().is_empty() {
            return Err(crate::Error::config("EC2InstanceID cannot be empty"));
        }
        if self.zone_id.trim().is_empty() {
            return Err(crate::Error::config("DomainZoneID cannot be empty"));
        }
        Ok(())
    }
}

/// Fixed operational settings
///
/// These are not read from the configuration file. The defaults are the
/// values the tool runs with; tests override the poll cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettings {
    /// Region for the provider session
    pub region: String,

    /// Availability zone filter for status queries
    pub availability_zone: String,

    /// Hostname of the managed A record
    pub hostname: String,

    /// TTL of the managed A record (seconds)
    pub record_ttl: i64,

    /// Comment attached to the record change
    pub record_comment: String,

    /// Delay between two state probes while waiting
    pub poll_interval: Duration,

    /// Maximum number of probes while waiting for a state
    ///
    /// With the default 5 second interval, 120 probes give the instance
    /// ten minutes to reach its target state.
    pub max_poll_attempts: usize,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            availability_zone: DEFAULT_AVAILABILITY_ZONE.to_string(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            record_ttl: DEFAULT_RECORD_TTL,
            record_comment: DEFAULT_RECORD_COMMENT.to_string(),
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 120,
        }
    }
}

impl CommandSettings {
    /// Set the poll cadence
    pub fn with_polling(mut self, interval: Duration, max_attempts: usize) -> Self {
        self.poll_interval = interval;
        self.max_poll_attempts = max_attempts;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_poll_attempts == 0 {
            return Err(crate::Error::config("max_poll_attempts must be > 0"));
        }
        if self.hostname.is_empty() {
            return Err(crate::Error::config("hostname cannot be empty"));
        }
        if self.record_ttl <= 0 {
            return Err(crate::Error::config("record TTL must be > 0"));
        }
        Ok(())
    }
}
