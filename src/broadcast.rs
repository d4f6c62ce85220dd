//! Fan-out of server messages to connected clients

use crate::auth::HostAuthority;
use crate::protocol::ServerMessage;
use crate::types::ConnectionId;
use std::collections::HashMap;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected client
    All,
    /// Connections that have logged in as host
    Host,
    Connection(ConnectionId),
}

/// A message queued by the game session for delivery
#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipient,
    pub msg: ServerMessage,
}

/// Per-connection outbound queues. Each WebSocket task drains its own queue,
/// so messages reach a client in the order the game produced them.
#[derive(Debug, Default)]
pub struct Broadcaster {
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, conn_id: ConnectionId, sender: mpsc::UnboundedSender<ServerMessage>) {
        self.connections.insert(conn_id, sender);
    }

    pub fn unregister(&mut self, conn_id: &ConnectionId) {
        self.connections.remove(conn_id);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn deliver(&mut self, outbound: Outbound, hosts: &HostAuthority) {
        match outbound.to {
            Recipient::All => {
                // Ignore send errors (socket task already exiting)
                for sender in self.connections.values() {
                    let _ = sender.send(outbound.msg.clone());
                }
            }
            Recipient::Host => {
                for conn_id in hosts.authorized_connections() {
                    self.send_to(conn_id, outbound.msg.clone());
                }
            }
            Recipient::Connection(conn_id) => self.send_to(&conn_id, outbound.msg),
        }
    }

    fn send_to(&self, conn_id: &ConnectionId, msg: ServerMessage) {
        match self.connections.get(conn_id) {
            Some(sender) => {
                let _ = sender.send(msg);
            }
            None => tracing::debug!("Dropping message for closed connection {}", conn_id),
        }
    }
}
