pub mod flash;
pub mod sequence;
pub mod time;

pub use flash::{FieldValue, FlashEvent, GeoPosition, RawFlashRecord};
pub use sequence::{normalize, EventSequence, MalformedPolicy, NormalizeOptions};
pub use time::{tai93_to_utc, StartTimeFormat};
