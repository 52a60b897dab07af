pub mod card;
pub mod review;

pub use card::{Card, CardSchedule, DEFAULT_EASE_FACTOR};
pub use review::{
  Quality, ReviewHistoryEntry, DEFAULT_RESPONSE_TIME_SECS, MAX_QUALITY, PASSING_QUALITY,
};
