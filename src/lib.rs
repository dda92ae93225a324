pub mod config;
pub mod deck;
pub mod error;
pub mod fetch;
pub mod media;
pub mod pipeline;
pub mod subtitle;
pub mod translate;

pub use config::Config;
pub use error::{Result, SubcardsError};
pub use pipeline::{
    build_deck, build_deck_with_cancel, print_summary, DeckConfig, DeckResult, DeckStats,
};
