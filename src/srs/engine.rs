use rand::Rng;

use crate::config::SrsConfig;
use crate::domain::{Card, CardSchedule, Quality, ReviewHistoryEntry};
use crate::srs::card_selector;
use crate::srs::clock::{Clock, SystemClock};
use crate::srs::insights::{self, PerformanceInsights, Recommendation};
use crate::srs::sm2;
use crate::srs::stats::{self, DayProgress, StudyStats};

/// SM-2 scheduler and statistics over caller-owned cards and history.
///
/// Holds only its constants and a clock; every call takes the state it needs
/// and returns new values instead of mutating its inputs.
#[derive(Debug, Clone)]
pub struct SpacedRepetitionEngine<C: Clock = SystemClock> {
  config: SrsConfig,
  clock: C,
}

impl SpacedRepetitionEngine<SystemClock> {
  pub fn new(config: SrsConfig) -> Self {
    Self::with_clock(config, SystemClock)
  }
}

impl Default for SpacedRepetitionEngine<SystemClock> {
  fn default() -> Self {
    Self::new(SrsConfig::default())
  }
}

impl<C: Clock> SpacedRepetitionEngine<C> {
  pub fn with_clock(config: SrsConfig, clock: C) -> Self {
    Self { config, clock }
  }

  pub fn config(&self) -> &SrsConfig {
    &self.config
  }

  pub fn clock(&self) -> &C {
    &self.clock
  }

  pub fn calculate_next_review(&self, schedule: &CardSchedule, quality: Quality) -> CardSchedule {
    let next = sm2::calculate_next_review(&self.config, schedule, quality, self.clock.now_utc());
    tracing::debug!(
      "quality {} -> ease {:?}, interval {}d, repetitions {}",
      quality.value(),
      next.ease_factor,
      next.interval,
      next.repetitions
    );
    next
  }

  pub fn get_cards_for_review(&self, cards: &[Card]) -> Vec<Card> {
    card_selector::get_cards_for_review(cards, self.clock.now_utc())
  }

  pub fn get_study_stats(&self, cards: &[Card]) -> StudyStats {
    stats::get_study_stats(&self.config, cards, self.clock.now())
  }

  /// Session using the configured default length
  pub fn generate_default_session<R: Rng + ?Sized>(&self, cards: &[Card], rng: &mut R) -> Vec<Card> {
    self.generate_study_session(cards, self.config.session_length, rng)
  }

  pub fn generate_study_session<R: Rng + ?Sized>(
    &self,
    cards: &[Card],
    session_length: usize,
    rng: &mut R,
  ) -> Vec<Card> {
    card_selector::generate_study_session(cards, session_length, self.clock.now_utc(), rng)
  }

  pub fn shuffle<T: Clone, R: Rng + ?Sized>(&self, items: &[T], rng: &mut R) -> Vec<T> {
    card_selector::shuffle(items, rng)
  }

  pub fn calculate_retention_rate(&self, history: &[ReviewHistoryEntry]) -> u32 {
    stats::calculate_retention_rate(history)
  }

  pub fn calculate_study_streak(&self, history: &[ReviewHistoryEntry]) -> u32 {
    stats::calculate_study_streak(history, self.clock.now())
  }

  pub fn calculate_total_study_time(&self, history: &[ReviewHistoryEntry]) -> f64 {
    stats::calculate_total_study_time(&self.config, history)
  }

  pub fn get_weekly_progress(&self, history: &[ReviewHistoryEntry]) -> Vec<DayProgress> {
    stats::get_weekly_progress(history, self.clock.now())
  }

  pub fn get_performance_insights(&self, cards: &[Card], history: &[ReviewHistoryEntry]) -> PerformanceInsights {
    insights::get_performance_insights(&self.config, cards, history, self.clock.now())
  }

  pub fn generate_recommendations(
    &self,
    stats: &StudyStats,
    retention_rate: u32,
    avg_ease_factor: f64,
  ) -> Vec<Recommendation> {
    insights::generate_recommendations(&self.config, stats, retention_rate, avg_ease_factor)
  }
}
