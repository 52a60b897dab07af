//! Flashcard content.
//!
//! Decks are plain JSON files holding card text only; schedule state is merged
//! in from the progress store at load time.

pub mod cards;

pub use cards::{load_deck, parse_deck, CardDefinition, CardLoadError, DeckData};
