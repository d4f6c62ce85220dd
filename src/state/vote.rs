use super::GameSession;
use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::types::*;
use chrono::{DateTime, Utc};

impl GameSession {
    /// Record a player's vote for the active round.
    ///
    /// First accepted vote wins; there is no changing it afterwards.
    pub fn submit_vote(
        &mut self,
        conn_id: &ConnectionId,
        choice: &str,
        session_id: &SessionId,
    ) -> Result<Choice, GameError> {
        self.submit_vote_at(conn_id, choice, session_id, Utc::now())
    }

    pub fn submit_vote_at(
        &mut self,
        conn_id: &ConnectionId,
        choice: &str,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Choice, GameError> {
        if self.game.phase != GamePhase::Question {
            return Err(GameError::InvalidCommandForPhase {
                command: "submit_vote",
                phase: self.game.phase,
            });
        }

        let debounce = chrono::Duration::milliseconds(self.config.vote_debounce_ms);
        let player = self
            .players
            .get_mut(session_id)
            .ok_or_else(|| GameError::UnknownSession(session_id.clone()))?;

        if player.current_vote.is_some() {
            return Err(GameError::DuplicateVote);
        }

        let choice =
            Choice::parse_vote(choice).ok_or_else(|| GameError::InvalidChoice(choice.to_string()))?;

        if let Some(last) = player.last_vote_at {
            if now - last <= debounce {
                return Err(GameError::VoteDebounced);
            }
        }

        player.current_vote = Some(choice);
        player.last_vote_at = Some(now);
        self.game.tally.increment(choice);

        tracing::debug!(
            "Vote {} recorded, tally now {:?}",
            choice.label(),
            self.game.tally
        );

        self.send_to(conn_id, ServerMessage::VoteRegistered { choice });
        let tally = self.game.tally.clone();
        self.broadcast_to_all(ServerMessage::StatsUpdate { tally });

        Ok(choice)
    }
}
