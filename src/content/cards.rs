//! Deck loading - reads flashcard definitions from deck JSON files.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::domain::{Card, CardSchedule};

/// Card definition from a deck file. Content only; schedules live in the
/// progress store.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDefinition {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<CardDefinition> for Card {
    fn from(def: CardDefinition) -> Self {
        Card {
            id: def.id,
            front: def.front,
            back: def.back,
            category: def.category,
            schedule: CardSchedule::default(),
        }
    }
}

/// Container for cards in a deck file.
#[derive(Debug, Deserialize)]
pub struct DeckData {
    #[serde(default)]
    pub name: Option<String>,
    pub cards: Vec<CardDefinition>,
}

/// Load cards from a deck JSON file.
///
/// Cards with a duplicate id are dropped (first one wins) so that schedules
/// keyed by id stay unambiguous.
pub fn load_deck(path: &Path) -> Result<Vec<Card>, CardLoadError> {
    if !path.exists() {
        return Err(CardLoadError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CardLoadError::IoError(path.display().to_string(), e.to_string()))?;

    let data = parse_deck(&content)
        .map_err(|e| CardLoadError::ParseError(path.display().to_string(), e.to_string()))?;

    let deck_name = data.name.as_deref().unwrap_or("deck");
    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(data.cards.len());
    for def in data.cards {
        if !seen.insert(def.id.clone()) {
            tracing::warn!("Skipping duplicate card id '{}' in {}", def.id, path.display());
            continue;
        }
        cards.push(Card::from(def));
    }

    tracing::debug!("Loaded {} cards from {} ({})", cards.len(), deck_name, path.display());
    Ok(cards)
}

pub fn parse_deck(content: &str) -> Result<DeckData, serde_json::Error> {
    serde_json::from_str(content)
}

/// Deck loading errors.
#[derive(Debug)]
pub enum CardLoadError {
    FileNotFound(String),
    IoError(String, String),
    ParseError(String, String),
}

impl std::fmt::Display for CardLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardLoadError::FileNotFound(path) => write!(f, "Deck file not found: {}", path),
            CardLoadError::IoError(path, err) => write!(f, "IO error reading {}: {}", path, err),
            CardLoadError::ParseError(path, err) => write!(f, "Parse error in {}: {}", path, err),
        }
    }
}

impl CardLoadError {
    /// Returns a user-facing error message without exposing filesystem paths.
    pub fn user_message(&self) -> &'static str {
        match self {
            CardLoadError::FileNotFound(_) => "Deck file not found",
            CardLoadError::IoError(_, _) => "Failed to read deck file",
            CardLoadError::ParseError(_, _) => "Failed to parse deck file",
        }
    }
}

impl std::error::Error for CardLoadError {}
