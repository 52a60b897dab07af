pub mod card_selector;
pub mod clock;
pub mod engine;
pub mod insights;
pub mod sm2;
pub mod stats;

pub use card_selector::{generate_study_session, get_cards_for_review, shuffle};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::SpacedRepetitionEngine;
pub use insights::{
  generate_recommendations, get_performance_insights, DifficultCard, PerformanceInsights,
  Recommendation, RecommendationKind,
};
pub use sm2::calculate_next_review;
pub use stats::{
  calculate_retention_rate, calculate_study_streak, calculate_total_study_time, get_study_stats,
  get_weekly_progress, DayProgress, StudyStats,
};

/// Errors raised at the scheduler's input boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrsError {
  /// Quality rating outside 0-5
  InvalidQuality(i64),
}

impl std::fmt::Display for SrsError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SrsError::InvalidQuality(q) => write!(f, "Invalid quality rating {} (expected 0-5)", q),
    }
  }
}

impl std::error::Error for SrsError {}
