//! The game loop.
//!
//! One task owns the `GameSession` and processes every client message,
//! connection change and timer tick in arrival order, so no game state is
//! ever shared between tasks.

use crate::broadcast::{Broadcaster, Outbound, Recipient};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::GameSession;
use crate::types::ConnectionId;
use crate::ws::handlers;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum Event {
    Connected {
        conn_id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    },
    Message {
        conn_id: ConnectionId,
        msg: ClientMessage,
    },
    Disconnected {
        conn_id: ConnectionId,
    },
    TimerTick {
        generation: u64,
    },
}

/// Cloneable handle for posting events into the game loop
#[derive(Debug, Clone)]
pub struct GameHandle {
    events: mpsc::UnboundedSender<Event>,
}

impl GameHandle {
    /// Returns false if the game loop has stopped
    pub fn send(&self, event: Event) -> bool {
        self.events.send(event).is_ok()
    }
}

pub struct GameLoop {
    session: GameSession,
    broadcaster: Broadcaster,
    events: mpsc::UnboundedReceiver<Event>,
}

impl GameLoop {
    /// Build a loop; the closure receives the sender the round timer posts ticks to
    pub fn new(build: impl FnOnce(mpsc::UnboundedSender<Event>) -> GameSession) -> (Self, GameHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = build(tx.clone());
        (
            Self {
                session,
                broadcaster: Broadcaster::new(),
                events: rx,
            },
            GameHandle { events: tx },
        )
    }

    pub async fn run(mut self) {
        tracing::info!("Game loop started");
        while let Some(event) = self.events.recv().await {
            self.handle_event(event);
        }
        tracing::info!("Game loop stopped");
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Connected { conn_id, sender } => {
                tracing::debug!("Connection {} registered", conn_id);
                self.broadcaster.register(conn_id, sender);
            }
            Event::Message { conn_id, msg } => {
                if let Some(reply) = handlers::handle_message(&mut self.session, &conn_id, msg) {
                    self.broadcaster.deliver(
                        Outbound {
                            to: Recipient::Connection(conn_id),
                            msg: reply,
                        },
                        &self.session.hosts,
                    );
                }
            }
            Event::Disconnected { conn_id } => {
                self.broadcaster.unregister(&conn_id);
                self.session.disconnect(&conn_id);
            }
            Event::TimerTick { generation } => self.session.on_timer_tick(generation),
        }

        for outbound in self.session.drain_outbox() {
            self.broadcaster.deliver(outbound, &self.session.hosts);
        }
    }
}

/// Spawn the game loop on the runtime and return a handle to it
pub fn spawn_game_loop(build: impl FnOnce(mpsc::UnboundedSender<Event>) -> GameSession) -> GameHandle {
    let (game_loop, handle) = GameLoop::new(build);
    tokio::spawn(game_loop.run());
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::HostAuthority;
    use crate::catalog::RoundCatalog;
    use crate::types::GameConfig;

    fn new_loop() -> GameLoop {
        let (game_loop, _handle) = GameLoop::new(|tx| {
            GameSession::new(
                GameConfig::default(),
                RoundCatalog::builtin(),
                HostAuthority::new(Some("pw".to_string())),
                tx,
            )
        });
        game_loop
    }

    fn connect(game_loop: &mut GameLoop, conn: &str) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        game_loop.handle_event(Event::Connected {
            conn_id: conn.to_string(),
            sender: tx,
        });
        rx
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_reply_delivered_before_broadcasts() {
        let mut game_loop = new_loop();
        let mut rx = connect(&mut game_loop, "c1");

        game_loop.handle_event(Event::Message {
            conn_id: "c1".to_string(),
            msg: ClientMessage::Join {
                name: "Alice".to_string(),
                session_id: "s1".to_string(),
            },
        });

        let msgs = drain(&mut rx);
        assert!(matches!(msgs[0], ServerMessage::PlayerDataUpdate(_)));
        assert!(matches!(msgs[1], ServerMessage::PreloadAssets { .. }));
        assert!(matches!(msgs[2], ServerMessage::StateUpdate { .. }));
        // Not a host, so no roster
        assert_eq!(msgs.len(), 3);
    }

    #[tokio::test]
    async fn test_request_state_replies_to_sender_only() {
        let mut game_loop = new_loop();
        let mut rx1 = connect(&mut game_loop, "c1");
        let mut rx2 = connect(&mut game_loop, "c2");

        game_loop.handle_event(Event::Message {
            conn_id: "c1".to_string(),
            msg: ClientMessage::RequestState,
        });

        assert_eq!(drain(&mut rx1).len(), 1);
        assert!(drain(&mut rx2).is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_unregisters() {
        let mut game_loop = new_loop();
        let mut rx = connect(&mut game_loop, "c1");
        game_loop.handle_event(Event::Disconnected {
            conn_id: "c1".to_string(),
        });

        game_loop.handle_event(Event::Message {
            conn_id: "c2".to_string(),
            msg: ClientMessage::Join {
                name: "Bob".to_string(),
                session_id: "s2".to_string(),
            },
        });

        assert!(drain(&mut rx).is_empty());
        assert_eq!(game_loop.broadcaster.connection_count(), 0);
    }
}
