use std::fmt::Debug;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::Timestamp;

/// Source of the current time.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}

/// A clock that only moves when told to. Used for deterministic timestamps.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Moves the clock to the given timestamp.
    pub fn set(&self, ts: Timestamp) {
        if let Ok(mut current) = self.current.lock() {
            *current = ts;
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.current.lock() {
            let delta = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
            *current = Timestamp::from_datetime(current.as_datetime() + delta);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.current
            .lock()
            .map(|ts| *ts)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}
