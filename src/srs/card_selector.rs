//! Due-card selection and study session building.
//!
//! Selection is deterministic: undated (new) cards first, then the most
//! overdue. Presentation order is randomized separately so that a session is
//! not always led by the same backlog.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::Card;

/// Cards that are new or whose `next_review` has passed, overdue-first.
///
/// The input is left untouched; each call recomputes from scratch.
pub fn get_cards_for_review(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
  let mut due: Vec<Card> = cards
    .iter()
    .filter(|card| card.schedule.is_due(now))
    .cloned()
    .collect();

  // Stable sort keeps deck order among undated cards
  due.sort_by(|a, b| match (a.schedule.next_review, b.schedule.next_review) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (Some(a), Some(b)) => a.cmp(&b),
  });

  due
}

/// Build a shuffled session of at most `session_length` cards.
///
/// Due cards are taken first in overdue order; remaining slots are filled
/// with never-reviewed cards that were not already picked.
pub fn generate_study_session<R: Rng + ?Sized>(
  cards: &[Card],
  session_length: usize,
  now: DateTime<Utc>,
  rng: &mut R,
) -> Vec<Card> {
  let mut session: Vec<Card> = get_cards_for_review(cards, now)
    .into_iter()
    .take(session_length)
    .collect();

  if session.len() < session_length {
    let picked: HashSet<&str> = session.iter().map(|c| c.id.as_str()).collect();
    let fill: Vec<Card> = cards
      .iter()
      .filter(|card| card.schedule.is_new() && !picked.contains(card.id.as_str()))
      .take(session_length - session.len())
      .cloned()
      .collect();
    session.extend(fill);
  }

  tracing::debug!("Built study session of {} cards", session.len());
  shuffle(&session, rng)
}

/// Fisher-Yates shuffle into a new vector; `items` is not modified.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
  let mut shuffled = items.to_vec();
  for i in (1..shuffled.len()).rev() {
    let j = rng.random_range(0..=i);
    shuffled.swap(i, j);
  }
  shuffled
}
