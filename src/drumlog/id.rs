//! Item identifiers.
//!
//! Ids are opaque strings. Two strategies exist:
//! - [`RandomIds`] (default): a v4 UUID, collision-free for all practical purposes.
//! - [`TimestampIds`]: the creation time in Unix milliseconds, matching ids written
//!   by earlier versions of the app. Consecutive calls within the same millisecond
//!   are bumped forward so a single generator never repeats itself.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

use crate::error::DrumlogError;

pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Default)]
pub struct TimestampIds {
    last: AtomicI64,
}

impl TimestampIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_millis(&self, now: i64) -> i64 {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now > prev { now } else { prev + 1 };
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl IdGenerator for TimestampIds {
    fn new_id(&self) -> String {
        self.next_millis(Utc::now().timestamp_millis()).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Random,
    Timestamp,
}

impl IdStrategy {
    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Random => Box::new(RandomIds),
            IdStrategy::Timestamp => Box::new(TimestampIds::new()),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Random => f.write_str("random"),
            IdStrategy::Timestamp => f.write_str("timestamp"),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = DrumlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" | "uuid" => Ok(IdStrategy::Random),
            "timestamp" => Ok(IdStrategy::Timestamp),
            other => Err(DrumlogError::Config(format!(
                "Unknown id strategy: {} (expected random or timestamp)",
                other
            ))),
        }
    }
}
