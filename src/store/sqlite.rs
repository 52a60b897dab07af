//! SQLite-backed progress store: one row per card schedule plus the review log.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;

use super::{ProgressStore, StoreError, StudyProgress};
use crate::domain::{CardSchedule, ReviewHistoryEntry};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS card_schedules (
      card_id TEXT PRIMARY KEY,
      ease_factor REAL,
      interval_days INTEGER NOT NULL DEFAULT 0,
      repetitions INTEGER NOT NULL DEFAULT 0,
      last_reviewed TEXT,
      next_review TEXT,
      quality INTEGER
    );

    CREATE TABLE IF NOT EXISTS review_logs (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      card_id TEXT,
      quality INTEGER NOT NULL,
      reviewed_at TEXT NOT NULL,
      response_time_secs REAL
    );

    CREATE INDEX IF NOT EXISTS idx_review_logs_reviewed_at ON review_logs(reviewed_at);
    "#,
  )?;
  Ok(())
}

pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  pub fn open(path: &Path) -> std::result::Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)
          .map_err(|e| StoreError::Io(path.display().to_string(), e.to_string()))?;
      }
    }

    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    tracing::debug!("Opened progress database at {}", path.display());
    Ok(Self { conn })
  }

  pub fn open_in_memory() -> std::result::Result<Self, StoreError> {
    let conn = Connection::open_in_memory()?;
    run_migrations(&conn)?;
    Ok(Self { conn })
  }

  pub fn get_schedule(&self, card_id: &str) -> Result<Option<CardSchedule>> {
    self
      .conn
      .query_row(
        r#"
        SELECT card_id, ease_factor, interval_days, repetitions, last_reviewed, next_review, quality
        FROM card_schedules
        WHERE card_id = ?1
        "#,
        params![card_id],
        |row| row_to_schedule(row).map(|(_, schedule)| schedule),
      )
      .optional()
  }
}

impl ProgressStore for SqliteStore {
  fn load(&self) -> std::result::Result<StudyProgress, StoreError> {
    let mut progress = StudyProgress::new();

    let mut stmt = self.conn.prepare(
      r#"
      SELECT card_id, ease_factor, interval_days, repetitions, last_reviewed, next_review, quality
      FROM card_schedules
      "#,
    )?;
    for row in stmt.query_map([], row_to_schedule)? {
      let (card_id, schedule) = row?;
      progress.schedules.insert(card_id, schedule);
    }

    let mut stmt = self.conn.prepare(
      r#"
      SELECT card_id, quality, reviewed_at, response_time_secs
      FROM review_logs
      ORDER BY id ASC
      "#,
    )?;
    progress.history = stmt
      .query_map([], row_to_review)?
      .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
      "Loaded {} schedules and {} reviews from database",
      progress.schedules.len(),
      progress.history.len()
    );
    Ok(progress)
  }

  /// Replace every row with `progress`
  fn save(&self, progress: &StudyProgress) -> std::result::Result<(), StoreError> {
    let tx = self.conn.unchecked_transaction()?;

    tx.execute("DELETE FROM card_schedules", [])?;
    for (card_id, schedule) in &progress.schedules {
      upsert_schedule(&tx, card_id, schedule)?;
    }

    tx.execute("DELETE FROM review_logs", [])?;
    for entry in &progress.history {
      insert_review_log(&tx, entry)?;
    }

    tx.commit()?;
    Ok(())
  }

  fn schedule(&self, card_id: &str) -> std::result::Result<CardSchedule, StoreError> {
    Ok(self.get_schedule(card_id)?.unwrap_or_default())
  }

  fn record(
    &self,
    card_id: &str,
    schedule: &CardSchedule,
    entry: &ReviewHistoryEntry,
  ) -> std::result::Result<(), StoreError> {
    let tx = self.conn.unchecked_transaction()?;
    upsert_schedule(&tx, card_id, schedule)?;
    insert_review_log(&tx, entry)?;
    tx.commit()?;
    Ok(())
  }

  fn clear(&self) -> std::result::Result<(), StoreError> {
    self.conn.execute_batch(
      r#"
      DELETE FROM card_schedules;
      DELETE FROM review_logs;
      "#,
    )?;
    Ok(())
  }
}

fn upsert_schedule(conn: &Connection, card_id: &str, schedule: &CardSchedule) -> Result<()> {
  conn.execute(
    r#"
    INSERT OR REPLACE INTO card_schedules
      (card_id, ease_factor, interval_days, repetitions, last_reviewed, next_review, quality)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
    params![
      card_id,
      schedule.ease_factor,
      schedule.interval,
      schedule.repetitions,
      schedule.last_reviewed.map(|t| t.to_rfc3339()),
      schedule.next_review.map(|t| t.to_rfc3339()),
      schedule.quality,
    ],
  )?;
  Ok(())
}

fn insert_review_log(conn: &Connection, entry: &ReviewHistoryEntry) -> Result<()> {
  conn
    .prepare_cached(
      "INSERT INTO review_logs (card_id, quality, reviewed_at, response_time_secs) VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![
      entry.card_id,
      entry.quality,
      entry.timestamp.to_rfc3339(),
      entry.response_time
    ])?;
  Ok(())
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
  value.and_then(|s| {
    DateTime::parse_from_rfc3339(&s)
      .ok()
      .map(|dt| dt.with_timezone(&Utc))
  })
}

fn row_to_schedule(row: &rusqlite::Row) -> Result<(String, CardSchedule)> {
  Ok((
    row.get(0)?,
    CardSchedule {
      ease_factor: row.get(1)?,
      interval: row.get(2)?,
      repetitions: row.get(3)?,
      last_reviewed: parse_timestamp(row.get(4)?),
      next_review: parse_timestamp(row.get(5)?),
      quality: row.get(6)?,
    },
  ))
}

fn row_to_review(row: &rusqlite::Row) -> Result<ReviewHistoryEntry> {
  let reviewed_at: String = row.get(2)?;
  let timestamp = DateTime::parse_from_rfc3339(&reviewed_at)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e)))?;

  Ok(ReviewHistoryEntry {
    card_id: row.get(0)?,
    quality: row.get(1)?,
    timestamp,
    response_time: row.get(3)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};
  use tempfile::TempDir;

  fn reviewed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 5, 7, 45, 0).unwrap()
  }

  fn schedule() -> CardSchedule {
    CardSchedule {
      ease_factor: Some(2.36),
      interval: 6,
      repetitions: 2,
      last_reviewed: Some(reviewed_at()),
      next_review: Some(reviewed_at() + Duration::days(6)),
      quality: Some(3),
    }
  }

  #[test]
  fn test_empty_database_loads_empty_progress() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.load().unwrap(), StudyProgress::default());
  }

  #[test]
  fn test_save_then_load() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut progress = StudyProgress::new();
    progress.schedules.insert("effects-3".into(), schedule());
    progress.schedules.insert("fresh".into(), CardSchedule::default());
    progress
      .history
      .push(ReviewHistoryEntry::new(reviewed_at(), 3).with_response_time(41.5));
    progress.history.push(ReviewHistoryEntry {
      card_id: Some("effects-3".into()),
      timestamp: reviewed_at() + Duration::minutes(1),
      quality: 1,
      response_time: None,
    });

    store.save(&progress).unwrap();
    assert_eq!(store.load().unwrap(), progress);

    // saving again replaces instead of appending
    store.save(&progress).unwrap();
    assert_eq!(store.load().unwrap().history.len(), 2);
  }

  #[test]
  fn test_get_schedule() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
      .record("ctx-1", &schedule(), &ReviewHistoryEntry::new(reviewed_at(), 4))
      .unwrap();

    assert_eq!(store.get_schedule("ctx-1").unwrap(), Some(schedule()));
    assert_eq!(store.get_schedule("missing").unwrap(), None);
    assert_eq!(store.load().unwrap().history.len(), 1);
  }

  #[test]
  fn test_record_appends_without_rewriting() {
    let store = SqliteStore::open_in_memory().unwrap();
    for minutes in 0..3 {
      let entry = ReviewHistoryEntry {
        card_id: Some("ctx-1".into()),
        timestamp: reviewed_at() + Duration::minutes(minutes),
        quality: 4,
        response_time: None,
      };
      store.record("ctx-1", &schedule(), &entry).unwrap();
    }

    assert_eq!(log_ids(&store), vec![1, 2, 3]);
    assert_eq!(store.schedule("ctx-1").unwrap(), schedule());
    assert_eq!(store.schedule("missing").unwrap(), CardSchedule::default());
    assert_eq!(store.load().unwrap().schedules.len(), 1);
  }

  #[test]
  fn test_tracker_reviews_keep_log_ids() {
    use crate::config::SrsConfig;
    use crate::domain::{Card, Quality};
    use crate::srs::{FixedClock, SpacedRepetitionEngine};
    use crate::tracker::StudyTracker;

    let engine = SpacedRepetitionEngine::with_clock(SrsConfig::default(), FixedClock::utc(reviewed_at()));
    let deck = vec![Card::new("a", "What is a fragment?", "A wrapper with no DOM node")];
    let tracker = StudyTracker::new(engine, SqliteStore::open_in_memory().unwrap(), deck);

    for _ in 0..3 {
      tracker.record_review("a", Quality::new(4).unwrap(), None).unwrap();
    }

    assert_eq!(log_ids(tracker.store()), vec![1, 2, 3]);
    assert_eq!(tracker.progress().unwrap().schedules["a"].repetitions, 3);
  }

  fn log_ids(store: &SqliteStore) -> Vec<i64> {
    let mut stmt = store.conn.prepare("SELECT id FROM review_logs ORDER BY id").unwrap();
    stmt
      .query_map([], |row| row.get(0))
      .unwrap()
      .collect::<Result<Vec<i64>>>()
      .unwrap()
  }

  #[test]
  fn test_file_database_persists_and_clears() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data/progress.db");

    {
      let store = SqliteStore::open(&path).unwrap();
      store
        .record("memo-2", &schedule(), &ReviewHistoryEntry::new(reviewed_at(), 3))
        .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let progress = store.load().unwrap();
    assert_eq!(progress.schedules.len(), 1);
    assert_eq!(progress.history.len(), 1);

    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), StudyProgress::default());
  }
}
