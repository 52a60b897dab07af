//! Aggregate performance report and rule-based study recommendations.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::config::SrsConfig;
use crate::domain::{Card, ReviewHistoryEntry};
use crate::srs::sm2::round_to_hundredths;
use crate::srs::stats::{self, DayProgress, StudyStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
  Improvement,
  Workload,
  Difficulty,
  Progress,
  Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
  #[serde(rename = "type")]
  pub kind: RecommendationKind,
  pub title: String,
  pub message: String,
}

impl Recommendation {
  fn new(kind: RecommendationKind, title: &str, message: impl Into<String>) -> Self {
    Self {
      kind,
      title: title.to_string(),
      message: message.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultCard {
  pub id: String,
  pub ease_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInsights {
  pub retention_rate: u32,
  pub average_ease_factor: f64,
  pub study_streak: u32,
  /// Hardest first
  pub difficult_cards: Vec<DifficultCard>,
  pub difficult_cards_count: usize,
  pub mastered_cards_count: usize,
  /// Minutes
  pub total_study_time: f64,
  pub weekly_progress: Vec<DayProgress>,
  pub recommendations: Vec<Recommendation>,
}

pub fn get_performance_insights<Tz: TimeZone>(
  config: &SrsConfig,
  cards: &[Card],
  history: &[ReviewHistoryEntry],
  now: DateTime<Tz>,
) -> PerformanceInsights {
  let retention_rate = stats::calculate_retention_rate(history);
  let study_stats = stats::get_study_stats(config, cards, now.clone());

  let eases: Vec<f64> = cards.iter().filter_map(|c| c.schedule.ease_factor).collect();
  let average_ease_factor = if eases.is_empty() {
    config.default_ease_factor
  } else {
    eases.iter().sum::<f64>() / eases.len() as f64
  };

  let mut difficult_cards: Vec<DifficultCard> = cards
    .iter()
    .filter_map(|card| {
      card
        .schedule
        .ease_factor
        .filter(|ease| *ease < config.difficult_ease_factor)
        .map(|ease_factor| DifficultCard {
          id: card.id.clone(),
          ease_factor,
        })
    })
    .collect();
  difficult_cards.sort_by(|a, b| a.ease_factor.total_cmp(&b.ease_factor));

  PerformanceInsights {
    retention_rate,
    average_ease_factor: round_to_hundredths(average_ease_factor),
    study_streak: stats::calculate_study_streak(history, now.clone()),
    difficult_cards_count: difficult_cards.len(),
    difficult_cards,
    mastered_cards_count: study_stats.mastered,
    total_study_time: stats::calculate_total_study_time(config, history),
    weekly_progress: stats::get_weekly_progress(history, now),
    recommendations: generate_recommendations(config, &study_stats, retention_rate, average_ease_factor),
  }
}

/// Independent rules evaluated in a fixed order; falls back to a single
/// success message when none apply.
pub fn generate_recommendations(
  config: &SrsConfig,
  stats: &StudyStats,
  retention_rate: u32,
  avg_ease_factor: f64,
) -> Vec<Recommendation> {
  let mut recommendations = Vec::new();

  if retention_rate < config.low_retention_percent {
    recommendations.push(Recommendation::new(
      RecommendationKind::Improvement,
      "Focus on Review",
      format!(
        "Your retention rate is below {}%. Consider reviewing cards more frequently and taking time to understand concepts thoroughly.",
        config.low_retention_percent
      ),
    ));
  }

  if stats.due_today > config.heavy_workload_cards {
    recommendations.push(Recommendation::new(
      RecommendationKind::Workload,
      "Large Review Queue",
      format!(
        "You have {} cards due today. Consider breaking your study session into smaller chunks.",
        stats.due_today
      ),
    ));
  }

  if avg_ease_factor < config.difficult_ease_factor {
    recommendations.push(Recommendation::new(
      RecommendationKind::Difficulty,
      "Challenging Material",
      "You're working with difficult concepts. Consider supplementing with additional resources or breaking down complex topics.",
    ));
  }

  if stats.new > 0 {
    recommendations.push(Recommendation::new(
      RecommendationKind::Progress,
      "New Cards Available",
      format!(
        "You have {} new cards to learn. Mix them with review cards for optimal learning.",
        stats.new
      ),
    ));
  }

  if recommendations.is_empty() {
    recommendations.push(Recommendation::new(
      RecommendationKind::Success,
      "Great Progress!",
      "You're maintaining good study habits. Keep up the excellent work!",
    ));
  }

  recommendations
}
