use super::GameSession;
use crate::protocol::{PlayerDataUpdate, ServerMessage};
use crate::types::*;
use indexmap::IndexMap;

pub const MAX_NAME_CHARS: usize = 12;
const DEFAULT_NAME: &str = "Player";

/// Trim, strip control characters and cap to `MAX_NAME_CHARS` characters
pub fn sanitize_display_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .chars()
        .take(MAX_NAME_CHARS)
        .collect();
    let name = name.trim_end().to_string();

    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    }
}

/// Player records keyed by client session token, in join order.
///
/// Records are never removed except by `clear` (hard reset), so a player who
/// reloads or loses connectivity keeps their score and vote.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    players: IndexMap<SessionId, Player>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection to a session, creating the player on first sight.
    /// Returns true if the player is new.
    ///
    /// A connection belongs to at most one player: if it was attached to
    /// another session, that player is detached first.
    pub fn attach(&mut self, session_id: &SessionId, name: &str, conn_id: &ConnectionId) -> bool {
        for player in self.players.values_mut() {
            if &player.session_id != session_id && player.connection.as_ref() == Some(conn_id) {
                player.connection = None;
            }
        }

        match self.players.get_mut(session_id) {
            Some(player) => {
                player.connection = Some(conn_id.clone());
                if !name.trim().is_empty() {
                    player.display_name = sanitize_display_name(name);
                }
                false
            }
            None => {
                self.players.insert(
                    session_id.clone(),
                    Player {
                        session_id: session_id.clone(),
                        display_name: sanitize_display_name(name),
                        score: 0,
                        current_vote: None,
                        last_vote_at: None,
                        connection: Some(conn_id.clone()),
                    },
                );
                true
            }
        }
    }

    /// Null the connection handle of whichever player holds this connection
    pub fn detach(&mut self, conn_id: &ConnectionId) -> Option<&Player> {
        let player = self
            .players
            .values_mut()
            .find(|p| p.connection.as_ref() == Some(conn_id))?;
        player.connection = None;
        Some(player)
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Player> {
        self.players.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &SessionId) -> Option<&mut Player> {
        self.players.get_mut(session_id)
    }

    /// Players in join order
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Forget every round vote (new round)
    pub fn clear_votes(&mut self) {
        for player in self.players.values_mut() {
            player.current_vote = None;
        }
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }
}

impl GameSession {
    /// Player joins or rejoins with their session token
    pub fn join(&mut self, conn_id: &ConnectionId, name: &str, session_id: &SessionId) {
        let is_new = self.players.attach(session_id, name, conn_id);

        let Some(player) = self.players.get(session_id) else {
            return;
        };
        if is_new {
            tracing::info!("Player {} joined", player.display_name);
        } else {
            tracing::info!(
                "Player {} reconnected (score {}, voted: {})",
                player.display_name,
                player.score,
                player.current_vote.is_some()
            );
        }

        let update = ServerMessage::PlayerDataUpdate(PlayerDataUpdate {
            score: Some(player.score),
            my_vote: player.current_vote,
            round_result: None,
        });
        self.send_to(conn_id, update);

        let urls = self.catalog.media_urls();
        self.send_to(conn_id, ServerMessage::PreloadAssets { urls });

        self.broadcast_state();
        self.broadcast_host_state();
    }
}
