//! Lightning flash playback.
//!
//! Loads geolocated, timestamped flashes, orders them, and replays them
//! group by group on a map, a time-series chart and a virtual clock, looping
//! over the data set until stopped.

pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod playback;
pub mod sync;

pub use crate::core::{normalize, EventSequence, FlashEvent, RawFlashRecord};
pub use error::FlashError;
pub use playback::{PlaybackController, PlaybackEngine, PlaybackSession};
pub use sync::ViewSynchronizer;
