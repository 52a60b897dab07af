use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::SrsError;

/// Lowest rating that counts as a successful recall.
pub const PASSING_QUALITY: u8 = 3;

/// Highest rating on the 0-5 scale.
pub const MAX_QUALITY: u8 = 5;

/// Seconds assumed for a review that recorded no response time.
pub const DEFAULT_RESPONSE_TIME_SECS: f64 = 30.0;

/// A validated 0-5 recall rating.
///
/// 0 is a total blackout, 5 is perfect recall; 3 and above is a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
  pub fn new(value: u8) -> Result<Self, SrsError> {
    if value > MAX_QUALITY {
      return Err(SrsError::InvalidQuality(i64::from(value)));
    }
    Ok(Self(value))
  }

  pub fn value(self) -> u8 {
    self.0
  }

  pub fn is_pass(self) -> bool {
    self.0 >= PASSING_QUALITY
  }
}

impl TryFrom<i64> for Quality {
  type Error = SrsError;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    u8::try_from(value)
      .map_err(|_| SrsError::InvalidQuality(value))
      .and_then(Quality::new)
  }
}

impl From<Quality> for u8 {
  fn from(quality: Quality) -> Self {
    quality.0
  }
}

/// One graded review. Append-only; never edited after it is logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewHistoryEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub card_id: Option<String>,
  pub timestamp: DateTime<Utc>,
  pub quality: u8,
  /// Seconds spent on the card
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response_time: Option<f64>,
}

impl ReviewHistoryEntry {
  pub fn new(timestamp: DateTime<Utc>, quality: u8) -> Self {
    Self {
      card_id: None,
      timestamp,
      quality,
      response_time: None,
    }
  }

  pub fn for_card(card_id: impl Into<String>, timestamp: DateTime<Utc>, quality: Quality) -> Self {
    Self {
      card_id: Some(card_id.into()),
      timestamp,
      quality: quality.value(),
      response_time: None,
    }
  }

  pub fn with_response_time(mut self, seconds: f64) -> Self {
    self.response_time = Some(seconds);
    self
  }

  pub fn is_pass(&self) -> bool {
    self.quality >= PASSING_QUALITY
  }

  /// Seconds spent, falling back to `default` when none was recorded
  pub fn response_time_or(&self, default: f64) -> f64 {
    self.response_time.unwrap_or(default)
  }
}
