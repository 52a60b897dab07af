use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prep_srs::config::{self, AppConfig};
use prep_srs::content;
use prep_srs::content::CardLoadError;
use prep_srs::domain::Card;
use prep_srs::srs::SpacedRepetitionEngine;
use prep_srs::store::{self, StoreError};
use prep_srs::tracker::{StudyTracker, TrackerError};

/// Spaced repetition study companion for interview prep flashcards.
#[derive(Parser, Debug)]
#[command(name = "prep-srs", version, about)]
struct Cli {
  /// Configuration file
  #[arg(long, global = true, default_value = config::CONFIG_FILE)]
  config: PathBuf,

  /// Deck JSON file (overrides configuration)
  #[arg(long, global = true)]
  deck: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Card counts by stage and due day
  Stats,
  /// List due cards, most overdue first
  Due,
  /// Build a shuffled study session
  Session {
    #[arg(long)]
    length: Option<usize>,
    /// Seed for a reproducible order
    #[arg(long)]
    seed: Option<u64>,
  },
  /// Grade a card 0-5
  Review {
    card_id: String,
    #[arg(allow_negative_numbers = true)]
    quality: i64,
    /// Seconds spent on the card
    #[arg(long)]
    response_time: Option<f64>,
  },
  /// Performance report as JSON
  Insights,
  /// Delete all study progress
  Reset,
}

fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prep_srs=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{}", e);
      eprintln!("error: {}", user_message(&*e));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
  let mut app_config = AppConfig::load_from(&cli.config);
  if let Some(deck) = cli.deck {
    app_config.deck_path = deck;
  }

  let deck = content::load_deck(&app_config.deck_path)?;
  let store = store::open_store(&app_config)?;
  let engine = SpacedRepetitionEngine::new(app_config.srs.clone());
  let tracker = StudyTracker::new(engine, store, deck);

  match cli.command {
    Command::Stats => {
      println!("{}", serde_json::to_string_pretty(&tracker.stats()?)?);
    }
    Command::Due => {
      let due = tracker.due_cards()?;
      println!("{} card(s) due", due.len());
      print_cards(&due);
    }
    Command::Session { length, seed } => {
      let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
      };
      let session = tracker.session(length, &mut rng)?;
      print_cards(&session);
    }
    Command::Review {
      card_id,
      quality,
      response_time,
    } => {
      let next = tracker.grade(&card_id, quality, response_time)?;
      println!("{}", serde_json::to_string_pretty(&next)?);
    }
    Command::Insights => {
      println!("{}", serde_json::to_string_pretty(&tracker.insights()?)?);
    }
    Command::Reset => {
      tracker.reset()?;
      println!("Progress cleared");
    }
  }

  Ok(())
}

/// Path-free message for errors we know; anything else prints as is
fn user_message(err: &(dyn std::error::Error + 'static)) -> String {
  if let Some(e) = err.downcast_ref::<TrackerError>() {
    e.user_message()
  } else if let Some(e) = err.downcast_ref::<StoreError>() {
    e.user_message().to_string()
  } else if let Some(e) = err.downcast_ref::<CardLoadError>() {
    e.user_message().to_string()
  } else {
    err.to_string()
  }
}

fn print_cards(cards: &[Card]) {
  for card in cards {
    let category = card.category.as_deref().unwrap_or("-");
    println!("{:<24} [{}] {}", card.id, category, card.front);
  }
}
