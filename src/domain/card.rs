use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ease factor assigned to cards that have never been graded.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// SM-2 scheduling state for a single card.
///
/// Every field is optional on the wire; missing fields mean a new card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSchedule {
  /// None until the first review; read through [`CardSchedule::ease_or`].
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ease_factor: Option<f64>,
  #[serde(default)]
  pub interval: u32,
  #[serde(default)]
  pub repetitions: u32,
  #[serde(default)]
  pub last_reviewed: Option<DateTime<Utc>>,
  #[serde(default)]
  pub next_review: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quality: Option<u8>,
}

impl CardSchedule {
  pub fn new() -> Self {
    Self::default()
  }

  /// Ease factor, falling back to `default` for never-graded cards
  pub fn ease_or(&self, default: f64) -> f64 {
    self.ease_factor.unwrap_or(default)
  }

  pub fn is_new(&self) -> bool {
    self.last_reviewed.is_none()
  }

  /// True if the card has no due date or the due date has passed
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review.map_or(true, |next| next <= now)
  }
}

/// A flashcard: content the engine never touches plus its schedule state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id: String,
  pub front: String,
  pub back: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(flatten)]
  pub schedule: CardSchedule,
}

impl Card {
  pub fn new(id: impl Into<String>, front: impl Into<String>, back: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      front: front.into(),
      back: back.into(),
      category: None,
      schedule: CardSchedule::new(),
    }
  }

  pub fn with_schedule(mut self, schedule: CardSchedule) -> Self {
    self.schedule = schedule;
    self
  }
}
