//! Time source for simulated delays and log timestamps.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

/// Format used for `LogEntry::time`.
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend the current run for a simulated delay.
    async fn sleep(&self, duration: Duration);

    fn now(&self) -> DateTime<Local>;

    fn timestamp(&self) -> String {
        self.now().format(TIME_FORMAT).to_string()
    }
}

/// Real delays on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Skips every delay; only yields so other tasks can observe the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantClock;

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
