//! External collaborators: the clock display sink, the authoritative time
//! source, and the host OS time-setting capability.
//!
//! The interpreter only ever sees these trait objects; everything
//! host-privileged or platform-specific stays behind them.

pub mod clock;
pub mod script;

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::timefmt::Timestamp;

pub use clock::{LogClockSink, SystemTimeSource};
pub use script::ScriptTimeSetter;

/// Accepts a timestamp and refreshes a visible clock representation.
/// Errors are non-fatal to command handling.
#[async_trait]
pub trait ClockSink: Send + Sync {
    async fn update(&self, timestamp: &Timestamp) -> Result<(), CollaboratorError>;
}

/// Authoritative current-time source. Callers fall back to session state
/// when this fails.
#[async_trait]
pub trait TimeSource: Send + Sync {
    async fn now(&self) -> Result<Timestamp, CollaboratorError>;
}

/// Host OS time-setting capability. Takes a formatted time string; failures
/// carry the collaborator's diagnostic output.
#[async_trait]
pub trait TimeSetter: Send + Sync {
    async fn apply(&self, formatted: &str) -> Result<(), CollaboratorError>;
}
