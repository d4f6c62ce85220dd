use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type ConnectionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    Question,
    Reveal,
    Leaderboard,
    GameOver,
}

impl GamePhase {
    /// Phases in which the cached result is shown to clients
    pub fn shows_result(&self) -> bool {
        matches!(
            self,
            GamePhase::Reveal | GamePhase::Leaderboard | GamePhase::GameOver
        )
    }
}

/// The two answers a player can give for a round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Choice {
    Ai,
    Real,
}

/// Answer labels from older round content that map onto a current choice.
/// Round content authored before the rename still says "HUMAN".
const LEGACY_ANSWER_LABELS: &[(&str, Choice)] = &[("HUMAN", Choice::Real)];

impl Choice {
    pub const ALL: [Choice; 2] = [Choice::Ai, Choice::Real];

    pub fn label(&self) -> &'static str {
        match self {
            Choice::Ai => "AI",
            Choice::Real => "REAL",
        }
    }

    /// Parse a vote as sent by a client (case-insensitive, current labels only)
    pub fn parse_vote(raw: &str) -> Option<Choice> {
        let normalized = raw.trim().to_uppercase();
        Choice::ALL
            .into_iter()
            .find(|choice| choice.label() == normalized)
    }

    /// Resolve an answer label from round content, folding legacy labels
    pub fn resolve_answer(raw: &str) -> Option<Choice> {
        let normalized = raw.trim().to_uppercase();
        LEGACY_ANSWER_LABELS
            .iter()
            .find(|(legacy, _)| *legacy == normalized)
            .map(|(_, choice)| *choice)
            .or_else(|| Choice::parse_vote(&normalized))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub round_seconds: u32,
    pub points_per_correct: u32,
    pub vote_debounce_ms: i64,
    pub round_leaderboard_size: usize,
    pub final_leaderboard_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: 15,
            points_per_correct: 100,
            vote_debounce_ms: 500,
            round_leaderboard_size: 5,
            final_leaderboard_size: 10,
        }
    }
}

/// Vote counts for the active round. Always holds exactly one entry per choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteTally(BTreeMap<Choice, u32>);

impl VoteTally {
    pub fn new() -> Self {
        Self(Choice::ALL.into_iter().map(|c| (c, 0)).collect())
    }

    pub fn get(&self, choice: Choice) -> u32 {
        self.0.get(&choice).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub(crate) fn increment(&mut self, choice: Choice) {
        *self.0.entry(choice).or_insert(0) += 1;
    }
}

impl Default for VoteTally {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub session_id: SessionId,
    pub display_name: String,
    pub score: u32,
    pub current_vote: Option<Choice>,
    pub last_vote_at: Option<DateTime<Utc>>,
    /// Connection currently attached to this session (None while disconnected)
    pub connection: Option<ConnectionId>,
}

/// One entry of the round catalog. The answer keeps the label as authored;
/// it is resolved to a `Choice` when the round is revealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDefinition {
    #[serde(skip)]
    pub ordinal: usize,
    #[serde(alias = "content")]
    pub media: String,
    pub answer: String,
}

/// What players see when a round starts (never includes the answer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundContent {
    pub ordinal: usize,
    pub media: String,
}

impl From<&RoundDefinition> for RoundContent {
    fn from(round: &RoundDefinition) -> Self {
        Self {
            ordinal: round.ordinal,
            media: round.media.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

/// Snapshot taken when a round is revealed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResult {
    pub correct_answer: Choice,
    pub stats: VoteTally,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Result cached on the game for late joiners and refreshes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CachedResult {
    Round(RoundResult),
    Final { leaderboard: Vec<LeaderboardEntry> },
}

impl CachedResult {
    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        match self {
            CachedResult::Round(result) => &result.leaderboard,
            CachedResult::Final { leaderboard } => leaderboard,
        }
    }
}

/// The single game in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub phase: GamePhase,
    pub round_index: usize,
    pub tally: VoteTally,
    /// Only set while the phase is QUESTION
    pub seconds_remaining: Option<u32>,
    pub last_result: Option<CachedResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            phase: GamePhase::Lobby,
            round_index: 0,
            tally: VoteTally::new(),
            seconds_remaining: None,
            last_result: None,
        }
    }
}
