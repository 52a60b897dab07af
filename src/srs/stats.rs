//! Study statistics derived from cards and the review history log.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::SrsConfig;
use crate::domain::{Card, ReviewHistoryEntry};
use crate::srs::clock::local_date;

/// Card counts by learning stage and by due day.
///
/// `new + learning + review + mastered == total`; the due buckets are a
/// separate, partial partition of the same cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
  pub total: usize,
  pub new: usize,
  pub learning: usize,
  pub review: usize,
  pub mastered: usize,
  pub due_today: usize,
  pub due_tomorrow: usize,
}

/// One day of the weekly chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayProgress {
  /// Short weekday label, e.g. "Mon"
  pub date: String,
  pub day: NaiveDate,
  pub reviews: usize,
  pub accuracy: u32,
}

pub fn get_study_stats<Tz: TimeZone>(config: &SrsConfig, cards: &[Card], now: DateTime<Tz>) -> StudyStats {
  let today = now.date_naive();
  let tomorrow = today + Days::new(1);

  let mut stats = StudyStats {
    total: cards.len(),
    ..StudyStats::default()
  };

  for card in cards {
    let schedule = &card.schedule;

    if schedule.is_new() {
      stats.new += 1;
    } else if schedule.repetitions < 2 {
      stats.learning += 1;
    } else if schedule.ease_factor.is_some_and(|ease| ease >= config.mastered_ease_factor) {
      stats.mastered += 1;
    } else {
      stats.review += 1;
    }

    match schedule.next_review.map(|next| local_date(next, &now)) {
      // unscheduled and overdue cards are both due today
      None => stats.due_today += 1,
      Some(day) if day <= today => stats.due_today += 1,
      Some(day) if day == tomorrow => stats.due_tomorrow += 1,
      Some(_) => {}
    }
  }

  stats
}

/// Percentage of reviews graded as a pass, 0 for an empty history
pub fn calculate_retention_rate(history: &[ReviewHistoryEntry]) -> u32 {
  let correct = history.iter().filter(|review| review.is_pass()).count();
  percentage(correct, history.len())
}

/// Consecutive calendar days with at least one review, ending today.
///
/// A day without reviews breaks the streak, so a history whose most recent
/// review was yesterday yields 0. Reviews dated after today are ignored.
pub fn calculate_study_streak<Tz: TimeZone>(history: &[ReviewHistoryEntry], now: DateTime<Tz>) -> u32 {
  let today = now.date_naive();
  let review_days: BTreeSet<NaiveDate> = history
    .iter()
    .map(|review| local_date(review.timestamp, &now))
    .filter(|day| *day <= today)
    .collect();

  let mut streak = 0u32;
  for day in review_days.iter().rev() {
    let expected = today - Days::new(u64::from(streak));
    if *day == expected {
      streak += 1;
    } else {
      break;
    }
  }

  streak
}

/// Total time spent reviewing, in minutes
pub fn calculate_total_study_time(config: &SrsConfig, history: &[ReviewHistoryEntry]) -> f64 {
  let seconds: f64 = history
    .iter()
    .map(|review| review.response_time_or(config.default_response_time_secs))
    .sum();
  seconds / 60.0
}

/// Review counts and accuracy for today and the six days before, oldest first.
pub fn get_weekly_progress<Tz: TimeZone>(history: &[ReviewHistoryEntry], now: DateTime<Tz>) -> Vec<DayProgress> {
  let today = now.date_naive();

  (0..7u64)
    .rev()
    .map(|days_ago| {
      let day = today - Days::new(days_ago);
      let (reviews, correct) = history
        .iter()
        .filter(|review| local_date(review.timestamp, &now) == day)
        .fold((0, 0), |(reviews, correct), review| {
          (reviews + 1, correct + usize::from(review.is_pass()))
        });

      DayProgress {
        date: day.format("%a").to_string(),
        day,
        reviews,
        accuracy: percentage(correct, reviews),
      }
    })
    .collect()
}

fn percentage(part: usize, whole: usize) -> u32 {
  if whole == 0 {
    return 0;
  }
  (100.0 * part as f64 / whole as f64).round() as u32
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::CardSchedule;
  use chrono::{Duration, FixedOffset, TimeZone, Utc};

  fn now() -> DateTime<FixedOffset> {
    // Wednesday
    Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap().fixed_offset()
  }

  fn card(id: &str, schedule: CardSchedule) -> Card {
    Card::new(id, "front", "back").with_schedule(schedule)
  }

  fn reviewed(ease: f64, repetitions: u32, next_in: Duration) -> CardSchedule {
    let now = now().to_utc();
    CardSchedule {
      ease_factor: Some(ease),
      interval: 1,
      repetitions,
      last_reviewed: Some(now - Duration::days(1)),
      next_review: Some(now + next_in),
      quality: Some(4),
    }
  }

  fn entry(days_ago: i64, quality: u8) -> ReviewHistoryEntry {
    ReviewHistoryEntry::new(now().to_utc() - Duration::days(days_ago), quality)
  }

  #[test]
  fn test_study_stats_categories() {
    let cards = vec![
      card("new", CardSchedule::new()),
      card("learning", reviewed(2.5, 1, Duration::days(1))),
      card("mastered", reviewed(2.6, 3, Duration::days(10))),
      card("review", reviewed(2.1, 4, Duration::days(10))),
    ];

    let stats = get_study_stats(&SrsConfig::default(), &cards, now());
    assert_eq!(stats.total, 4);
    assert_eq!(stats.new, 1);
    assert_eq!(stats.learning, 1);
    assert_eq!(stats.mastered, 1);
    assert_eq!(stats.review, 1);
    assert_eq!(stats.new + stats.learning + stats.review + stats.mastered, stats.total);
  }

  #[test]
  fn test_missing_ease_is_not_mastered() {
    let mut schedule = reviewed(2.5, 3, Duration::days(10));
    schedule.ease_factor = None;

    let stats = get_study_stats(&SrsConfig::default(), &[card("legacy", schedule)], now());
    assert_eq!(stats.mastered, 0);
    assert_eq!(stats.review, 1);
  }

  #[test]
  fn test_study_stats_due_buckets() {
    let cards = vec![
      card("new", CardSchedule::new()),
      card("overdue", reviewed(2.5, 2, Duration::days(-3))),
      card("later_today", reviewed(2.5, 2, Duration::hours(2))),
      card("tomorrow", reviewed(2.5, 2, Duration::days(1))),
      card("next_week", reviewed(2.5, 2, Duration::days(7))),
    ];

    let stats = get_study_stats(&SrsConfig::default(), &cards, now());
    assert_eq!(stats.due_today, 3);
    assert_eq!(stats.due_tomorrow, 1);
  }

  #[test]
  fn test_study_stats_empty() {
    assert_eq!(get_study_stats(&SrsConfig::default(), &[], now()), StudyStats::default());
  }

  #[test]
  fn test_retention_rate() {
    assert_eq!(calculate_retention_rate(&[]), 0);

    let history = vec![entry(0, 5), entry(0, 3), entry(1, 2)];
    assert_eq!(calculate_retention_rate(&history), 67);

    let all_fail = vec![entry(0, 0), entry(0, 1)];
    assert_eq!(calculate_retention_rate(&all_fail), 0);

    let all_pass = vec![entry(0, 4), entry(2, 5)];
    assert_eq!(calculate_retention_rate(&all_pass), 100);
  }

  #[test]
  fn test_streak_stops_at_gap() {
    let history = vec![entry(0, 4), entry(1, 4), entry(3, 4)];
    assert_eq!(calculate_study_streak(&history, now()), 2);
  }

  #[test]
  fn test_streak_counts_each_day_once() {
    let history = vec![entry(0, 4), entry(0, 1), entry(1, 4), entry(1, 5), entry(2, 3)];
    assert_eq!(calculate_study_streak(&history, now()), 3);
  }

  #[test]
  fn test_streak_requires_review_today() {
    let history = vec![entry(1, 4), entry(2, 4)];
    assert_eq!(calculate_study_streak(&history, now()), 0);
  }

  #[test]
  fn test_streak_unsorted_and_empty() {
    assert_eq!(calculate_study_streak(&[], now()), 0);

    let history = vec![entry(2, 4), entry(0, 4), entry(1, 4)];
    assert_eq!(calculate_study_streak(&history, now()), 3);
  }

  #[test]
  fn test_streak_ignores_future_reviews() {
    let history = vec![entry(-1, 4), entry(0, 4)];
    assert_eq!(calculate_study_streak(&history, now()), 1);
  }

  #[test]
  fn test_total_study_time() {
    let history = vec![
      entry(0, 4).with_response_time(90.0),
      entry(0, 4),
      entry(1, 2).with_response_time(60.0),
    ];
    assert!((calculate_total_study_time(&SrsConfig::default(), &history) - 3.0).abs() < 1e-9);
    assert_eq!(calculate_total_study_time(&SrsConfig::default(), &[]), 0.0);
  }

  #[test]
  fn test_weekly_progress_always_seven_days() {
    let week = get_weekly_progress(&[], now());
    assert_eq!(week.len(), 7);
    assert!(week.iter().all(|d| d.reviews == 0 && d.accuracy == 0));

    let old = vec![entry(30, 4)];
    assert_eq!(get_weekly_progress(&old, now()).len(), 7);
  }

  #[test]
  fn test_weekly_progress_counts() {
    let history = vec![entry(0, 5), entry(0, 1), entry(0, 4), entry(6, 2), entry(7, 5)];
    let week = get_weekly_progress(&history, now());

    let first = &week[0];
    assert_eq!(first.day, NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
    assert_eq!(first.date, "Thu");
    assert_eq!(first.reviews, 1);
    assert_eq!(first.accuracy, 0);

    let today = &week[6];
    assert_eq!(today.date, "Wed");
    assert_eq!(today.reviews, 3);
    assert_eq!(today.accuracy, 67);

    assert_eq!(week[3].reviews, 0);
  }
}
