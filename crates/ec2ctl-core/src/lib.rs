// # ec2ctl-core
//
// Core library for ec2ctl: start, stop and inspect one cloud instance and
// keep a DNS A record pointed at it.
//
// ## Architecture Overview
//
// - **ComputeProvider**: Trait for probing and changing the instance lifecycle
// - **DnsProvider**: Trait for submitting DNS record changes
// - **CommandEngine**: Runs one command (status, start, stop) with bounded polling
// - **InstanceConfig**: Instance and zone identifiers, loaded once from JSON
//
// ## Design Principles
//
// 1. **Explicit configuration**: Passed to the engine, never global
// 2. **Typed probes**: Probe failures are values the engine can reason about
// 3. **Engine-owned waiting**: Providers are single-shot, the engine polls
// 4. **Scriptable**: Every terminal outcome maps to an exit status

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{CommandSettings, InstanceConfig};
pub use engine::{Command, CommandEngine, DnsUpdate, ExitStatus, Outcome, Providers, run_from_file};
pub use error::{DnsErrorKind, Error, Result};
pub use state::{InstanceState, StateProbe};
pub use traits::{ComputeProvider, DnsProvider, RecordChange};
