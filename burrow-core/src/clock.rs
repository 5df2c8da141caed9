//! Clock abstraction for polling loops.
//!
//! Readiness polling sleeps through this trait so tests can run the loops
//! instantly and assert on attempt counts and settle delays.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Sleep source used by bounded retry loops.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the tokio timer.
#[derive(Debug, Default, Clone)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test clock that returns instantly and records every requested sleep.
#[derive(Debug, Default)]
pub struct ManualClock {
    slept: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// All sleeps requested so far, in order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }

    /// Sum of all requested sleeps.
    pub fn total_slept(&self) -> Duration {
        self.slept.lock().unwrap().iter().sum()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_records_sleeps() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_secs(2)).await;
        clock.sleep(Duration::from_secs(5)).await;
        assert_eq!(clock.slept(), vec![Duration::from_secs(2), Duration::from_secs(5)]);
        assert_eq!(clock.total_slept(), Duration::from_secs(7));
    }
}
