//! Study progress tracker.
//!
//! Glues a deck, a [`ProgressStore`] and the [`SpacedRepetitionEngine`]:
//! grading a card updates its schedule, appends to the review log and
//! persists both in one store write.

use rand::Rng;

use crate::domain::{Card, CardSchedule, Quality, ReviewHistoryEntry};
use crate::srs::{
  Clock, PerformanceInsights, SpacedRepetitionEngine, SrsError, StudyStats, SystemClock,
};
use crate::store::{ProgressStore, StoreError, StudyProgress};

pub struct StudyTracker<S: ProgressStore, C: Clock = SystemClock> {
  engine: SpacedRepetitionEngine<C>,
  store: S,
  deck: Vec<Card>,
}

impl<S: ProgressStore, C: Clock> StudyTracker<S, C> {
  pub fn new(engine: SpacedRepetitionEngine<C>, store: S, deck: Vec<Card>) -> Self {
    Self { engine, store, deck }
  }

  pub fn engine(&self) -> &SpacedRepetitionEngine<C> {
    &self.engine
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn progress(&self) -> Result<StudyProgress, TrackerError> {
    Ok(self.store.load()?)
  }

  /// Deck cards with their persisted schedules attached
  pub fn cards(&self) -> Result<Vec<Card>, TrackerError> {
    let progress = self.store.load()?;
    Ok(self.cards_with(&progress))
  }

  fn cards_with(&self, progress: &StudyProgress) -> Vec<Card> {
    let mut cards = self.deck.clone();
    progress.apply_to(&mut cards);
    cards
  }

  /// Validate a raw 0-5 grade, then [`record_review`](Self::record_review)
  pub fn grade(
    &self,
    card_id: &str,
    quality: i64,
    response_time: Option<f64>,
  ) -> Result<CardSchedule, TrackerError> {
    let quality = Quality::try_from(quality)?;
    self.record_review(card_id, quality, response_time)
  }

  /// Grade a card, persist its new schedule and log the review.
  pub fn record_review(
    &self,
    card_id: &str,
    quality: Quality,
    response_time: Option<f64>,
  ) -> Result<CardSchedule, TrackerError> {
    if !self.deck.iter().any(|card| card.id == card_id) {
      return Err(TrackerError::UnknownCard(card_id.to_string()));
    }

    let current = self.store.schedule(card_id)?;
    let next = self.engine.calculate_next_review(&current, quality);

    let timestamp = next.last_reviewed.unwrap_or_else(|| self.engine.clock().now_utc());
    let mut entry = ReviewHistoryEntry::for_card(card_id, timestamp, quality);
    entry.response_time = response_time;

    self.store.record(card_id, &next, &entry)?;

    tracing::info!(
      "Reviewed {} with quality {}: next review in {} day(s)",
      card_id,
      quality.value(),
      next.interval
    );
    Ok(next)
  }

  pub fn due_cards(&self) -> Result<Vec<Card>, TrackerError> {
    Ok(self.engine.get_cards_for_review(&self.cards()?))
  }

  pub fn stats(&self) -> Result<StudyStats, TrackerError> {
    Ok(self.engine.get_study_stats(&self.cards()?))
  }

  pub fn session<R: Rng + ?Sized>(
    &self,
    session_length: Option<usize>,
    rng: &mut R,
  ) -> Result<Vec<Card>, TrackerError> {
    let cards = self.cards()?;
    let length = session_length.unwrap_or(self.engine.config().session_length);
    Ok(self.engine.generate_study_session(&cards, length, rng))
  }

  pub fn insights(&self) -> Result<PerformanceInsights, TrackerError> {
    let progress = self.store.load()?;
    let cards = self.cards_with(&progress);
    Ok(self.engine.get_performance_insights(&cards, &progress.history))
  }

  /// Forget every schedule and review
  pub fn reset(&self) -> Result<(), TrackerError> {
    self.store.clear()?;
    tracing::info!("Study progress reset");
    Ok(())
  }
}

#[derive(Debug)]
pub enum TrackerError {
  Store(StoreError),
  UnknownCard(String),
  Quality(SrsError),
}

impl std::fmt::Display for TrackerError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TrackerError::Store(e) => write!(f, "{}", e),
      TrackerError::UnknownCard(id) => write!(f, "No card with id '{}' in the deck", id),
      TrackerError::Quality(e) => write!(f, "{}", e),
    }
  }
}

impl TrackerError {
  /// Returns a user-facing error message without exposing filesystem paths.
  pub fn user_message(&self) -> String {
    match self {
      TrackerError::Store(e) => e.user_message().to_string(),
      TrackerError::UnknownCard(id) => format!("No card with id '{}' in the deck", id),
      TrackerError::Quality(e) => e.to_string(),
    }
  }
}

impl std::error::Error for TrackerError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      TrackerError::Store(e) => Some(e),
      TrackerError::Quality(e) => Some(e),
      TrackerError::UnknownCard(_) => None,
    }
  }
}

impl From<StoreError> for TrackerError {
  fn from(e: StoreError) -> Self {
    TrackerError::Store(e)
  }
}

impl From<SrsError> for TrackerError {
  fn from(e: SrsError) -> Self {
    TrackerError::Quality(e)
  }
}
