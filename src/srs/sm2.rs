use chrono::{DateTime, Duration, Utc};

use crate::config::SrsConfig;
use crate::domain::{CardSchedule, Quality};

/// Compute a card's schedule after a graded review.
///
/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at the
/// configured minimum. Passing reviews walk the 1 -> 6 -> interval * EF'
/// progression; a lapse resets repetitions and restarts at one day.
/// Intervals are capped at `config.max_interval` days.
pub fn calculate_next_review(
  config: &SrsConfig,
  schedule: &CardSchedule,
  quality: Quality,
  now: DateTime<Utc>,
) -> CardSchedule {
  let q = f64::from(quality.value());
  let current_ease = schedule.ease_or(config.default_ease_factor);

  let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
  let new_ease_factor = (current_ease + ease_delta).max(config.min_ease_factor);

  let (new_interval, new_repetitions) = if quality.is_pass() {
    let interval = match schedule.repetitions {
      0 => config.first_interval,
      1 => config.second_interval,
      _ => (f64::from(schedule.interval) * new_ease_factor).round() as u32,
    };
    (interval, schedule.repetitions + 1)
  } else {
    (config.first_interval, 0)
  };
  let new_interval = new_interval.min(config.max_interval);

  CardSchedule {
    ease_factor: Some(round_to_hundredths(new_ease_factor)),
    interval: new_interval,
    repetitions: new_repetitions,
    last_reviewed: Some(now),
    next_review: Some(
      now
        .checked_add_signed(Duration::days(i64::from(new_interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC),
    ),
    quality: Some(quality.value()),
  }
}

pub(crate) fn round_to_hundredths(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}
