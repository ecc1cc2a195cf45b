//! Stage timing for pipeline runs.
//!
//! A run is anchored to a monotonic epoch taken when processing starts.
//! Each completed stage records the time elapsed since the previous lap,
//! so the recorded durations add up to the total run time.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Elapsed time for one named pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub elapsed_ms: f64,
}

/// A run clock that records per-stage laps relative to a fixed epoch.
#[derive(Debug, Clone)]
pub struct StageClock {
    /// The instant the run started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,

    /// End of the most recent lap.
    last_lap: Instant,

    laps: Vec<StageTiming>,
}

impl StageClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            epoch: now,
            epoch_wall: chrono::Utc::now().to_rfc3339(),
            last_lap: now,
            laps: Vec::new(),
        }
    }

    /// Close the current stage and return its duration in milliseconds.
    pub fn lap(&mut self, stage: impl Into<String>) -> f64 {
        let now = Instant::now();
        let elapsed_ms = Self::duration_ms(now - self.last_lap);
        self.last_lap = now;
        self.laps.push(StageTiming {
            stage: stage.into(),
            elapsed_ms,
        });
        elapsed_ms
    }

    /// Milliseconds since the run started.
    pub fn total_ms(&self) -> f64 {
        Self::duration_ms(self.epoch.elapsed())
    }

    /// Wall-clock time at run start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Recorded laps in completion order.
    pub fn laps(&self) -> &[StageTiming] {
        &self.laps
    }

    /// Consume the clock, returning its laps.
    pub fn into_laps(self) -> Vec<StageTiming> {
        self.laps
    }

    fn duration_ms(d: std::time::Duration) -> f64 {
        d.as_secs_f64() * 1_000.0
    }
}
