use async_trait::async_trait;
use tracing::info;

use crate::error::CollaboratorError;
use crate::timefmt::{format_date, FormatSpec, Timestamp};

use super::{ClockSink, TimeSource};

/// Time source backed by the local wall clock.
pub struct SystemTimeSource;

#[async_trait]
impl TimeSource for SystemTimeSource {
    async fn now(&self) -> Result<Timestamp, CollaboratorError> {
        Ok(Timestamp::now())
    }
}

/// Clock display sink that reports refreshes to the log.
///
/// Stands in for a real display surface; the server has no terminal of its
/// own to draw on.
pub struct LogClockSink {
    display_format: FormatSpec,
}

impl LogClockSink {
    pub fn new() -> LogClockSink {
        LogClockSink {
            display_format: FormatSpec::default_display(),
        }
    }
}

impl Default for LogClockSink {
    fn default() -> Self {
        LogClockSink::new()
    }
}

#[async_trait]
impl ClockSink for LogClockSink {
    async fn update(&self, timestamp: &Timestamp) -> Result<(), CollaboratorError> {
        info!(
            clock = %format_date(timestamp, &self.display_format),
            "clock display updated"
        );
        Ok(())
    }
}
