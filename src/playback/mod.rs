pub mod controller;
pub mod engine;

pub use controller::PlaybackController;
pub use engine::{PlaybackEngine, PlaybackSession};

use std::ops::Range;
use std::time::Duration;
use chrono::NaiveDate;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No timer scheduled
    Idle,
    /// Timer scheduled, cursor advancing
    Running,
}

/// Outcome of one advance of the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Indices of the events rendered this tick; they all share one timestamp
    Rendered(Range<usize>),
    /// The cursor ran past the last event and went back to the start
    Wrapped,
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Time between ticks
    pub tick_interval: Duration,
    /// Day shown by the cloud imagery overlay
    pub date: NaiveDate,
}

impl PlaybackConfig {
    pub const DEFAULT_TICK: Duration = Duration::from_millis(10);
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: Self::DEFAULT_TICK,
            date: NaiveDate::from_ymd_opt(2019, 3, 4).unwrap_or_default(),
        }
    }
}
