//! Data layer - deck and slide models without UI coupling

pub mod deck;

pub use deck::Deck;
