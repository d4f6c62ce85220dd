use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        #[serde(default)]
        name: String,
        session_id: SessionId,
    },
    SubmitVote {
        choice: String,
        session_id: SessionId,
    },
    RequestState,
    // Host-only messages
    HostLogin {
        password: String,
    },
    AdminStartRound,
    AdminShowLeaderboard,
    AdminNextRound,
    AdminHardReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    StateUpdate {
        state: PublicState,
    },
    /// Public state plus the player roster (host channel only)
    HostStateUpdate {
        state: PublicState,
        players: Vec<PlayerRosterEntry>,
    },
    NewRound {
        round: RoundContent,
        duration: u32,
    },
    TimerUpdate {
        seconds_remaining: u32,
    },
    /// Live tally; never includes who voted for what
    StatsUpdate {
        tally: VoteTally,
    },
    VoteRegistered {
        choice: Choice,
    },
    /// Private update for one player
    PlayerDataUpdate(PlayerDataUpdate),
    RoundResult {
        result: RoundResult,
    },
    PreloadAssets {
        urls: Vec<String>,
    },
    /// Tells every client to drop local state and reload
    GameResetEvent,
    LoginError {
        message: String,
    },
}

/// State every client may see
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicState {
    pub phase: GamePhase,
    pub round_index: usize,
    pub tally: VoteTally,
    pub seconds_remaining: Option<u32>,
    pub current_media: Option<String>,
    pub result: Option<CachedResult>,
    pub total_rounds: usize,
    pub player_count: usize,
}

/// Player roster row for the host console
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRosterEntry {
    pub name: String,
    pub score: u32,
    pub connected: bool,
}

impl From<&Player> for PlayerRosterEntry {
    fn from(p: &Player) -> Self {
        Self {
            name: p.display_name.clone(),
            score: p.score,
            connected: p.connection.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundOutcome {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerDataUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_result: Option<RoundOutcome>,
}
