//! Round catalog: the fixed, ordered list of rounds for a game.
//!
//! Loaded once at startup from a JSON file (or the built-in demo rounds)
//! and never modified afterwards.

use crate::types::{Choice, RoundDefinition};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read round catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse round catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("round catalog contains no rounds")]
    Empty,
    #[error("round {ordinal} has answer {answer:?} which matches no choice")]
    UnresolvableAnswer { ordinal: usize, answer: String },
}

#[derive(Debug, Clone)]
pub struct RoundCatalog {
    rounds: Vec<RoundDefinition>,
}

impl RoundCatalog {
    pub fn new(rounds: Vec<RoundDefinition>) -> Result<Self, CatalogError> {
        if rounds.is_empty() {
            return Err(CatalogError::Empty);
        }

        let rounds: Vec<RoundDefinition> = rounds
            .into_iter()
            .enumerate()
            .map(|(ordinal, round)| RoundDefinition { ordinal, ..round })
            .collect();

        if let Some(round) = rounds
            .iter()
            .find(|r| Choice::resolve_answer(&r.answer).is_none())
        {
            return Err(CatalogError::UnresolvableAnswer {
                ordinal: round.ordinal,
                answer: round.answer.clone(),
            });
        }

        Ok(Self { rounds })
    }

    /// Parse a catalog from a JSON array of `{ "media": ..., "answer": ... }`
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let rounds: Vec<RoundDefinition> = serde_json::from_str(json)?;
        Self::new(rounds)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} rounds from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Demo rounds used when no catalog file is configured
    pub fn builtin() -> Self {
        let rounds = [
            ("/assets/q1.webp", "HUMAN"),
            ("/assets/q2.webp", "AI"),
            ("/assets/q3.webp", "AI"),
        ]
        .into_iter()
        .enumerate()
        .map(|(ordinal, (media, answer))| RoundDefinition {
            ordinal,
            media: media.to_string(),
            answer: answer.to_string(),
        })
        .collect();

        Self { rounds }
    }

    pub fn get(&self, index: usize) -> Option<&RoundDefinition> {
        self.rounds.get(index)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Every media URL, in round order (sent to clients for preloading)
    pub fn media_urls(&self) -> Vec<String> {
        self.rounds.iter().map(|r| r.media.clone()).collect()
    }
}
