mod game;
mod player;
mod score;
mod vote;

pub use player::{sanitize_display_name, SessionRegistry, MAX_NAME_CHARS};

use crate::auth::HostAuthority;
use crate::broadcast::{Outbound, Recipient};
use crate::catalog::RoundCatalog;
use crate::engine::Event;
use crate::protocol::{PlayerRosterEntry, PublicState, ServerMessage};
use crate::timer::RoundTimer;
use crate::types::*;
use tokio::sync::mpsc;

/// The authoritative game state.
///
/// Owned by the game loop and mutated only from there, one event at a time.
/// Nothing here touches sockets: outgoing messages are queued in the outbox
/// and delivered by the loop after each event.
#[derive(Debug)]
pub struct GameSession {
    pub config: GameConfig,
    pub catalog: RoundCatalog,
    pub game: Game,
    pub players: SessionRegistry,
    pub hosts: HostAuthority,
    pub timer: RoundTimer,
    outbox: Vec<Outbound>,
}

impl GameSession {
    pub fn new(
        config: GameConfig,
        catalog: RoundCatalog,
        hosts: HostAuthority,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            config,
            catalog,
            game: Game::default(),
            players: SessionRegistry::new(),
            hosts,
            timer: RoundTimer::new(events),
            outbox: Vec::new(),
        }
    }

    pub fn public_state(&self) -> PublicState {
        let game = &self.game;
        PublicState {
            phase: game.phase,
            round_index: game.round_index,
            tally: game.tally.clone(),
            seconds_remaining: game.seconds_remaining,
            current_media: self.catalog.get(game.round_index).map(|r| r.media.clone()),
            result: if game.phase.shows_result() {
                game.last_result.clone()
            } else {
                None
            },
            total_rounds: self.catalog.len(),
            player_count: self.players.len(),
        }
    }

    pub fn roster(&self) -> Vec<PlayerRosterEntry> {
        self.players.iter().map(PlayerRosterEntry::from).collect()
    }

    pub fn state_update(&self) -> ServerMessage {
        ServerMessage::StateUpdate {
            state: self.public_state(),
        }
    }

    pub fn host_state_update(&self) -> ServerMessage {
        ServerMessage::HostStateUpdate {
            state: self.public_state(),
            players: self.roster(),
        }
    }

    /// Queue a message for every client
    pub fn broadcast_to_all(&mut self, msg: ServerMessage) {
        self.outbox.push(Outbound {
            to: Recipient::All,
            msg,
        });
    }

    /// Queue a message for the host channel
    pub fn broadcast_to_host(&mut self, msg: ServerMessage) {
        self.outbox.push(Outbound {
            to: Recipient::Host,
            msg,
        });
    }

    /// Queue a message for a single connection
    pub fn send_to(&mut self, conn_id: &ConnectionId, msg: ServerMessage) {
        self.outbox.push(Outbound {
            to: Recipient::Connection(conn_id.clone()),
            msg,
        });
    }

    pub fn broadcast_state(&mut self) {
        let msg = self.state_update();
        self.broadcast_to_all(msg);
    }

    pub fn broadcast_host_state(&mut self) {
        let msg = self.host_state_update();
        self.broadcast_to_host(msg);
    }

    /// Take everything queued since the last drain
    pub fn drain_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    /// A connection closed: detach it from its player and drop host rights
    pub fn disconnect(&mut self, conn_id: &ConnectionId) {
        if self.hosts.revoke(conn_id) {
            tracing::info!("Host connection {} closed", conn_id);
        }

        let detached = self.players.detach(conn_id).map(|p| p.display_name.clone());
        if let Some(name) = detached {
            tracing::info!("Player {} disconnected", name);
            self.broadcast_host_state();
        }
    }
}
