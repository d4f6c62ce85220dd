//! Host-only command handlers
//!
//! All handlers in this module except login require an authorized host connection.
//! Authorization is checked in the main dispatch layer before calling these.

use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::state::GameSession;
use crate::types::ConnectionId;

pub fn handle_login(
    session: &mut GameSession,
    conn_id: &ConnectionId,
    password: &str,
) -> Option<ServerMessage> {
    if session.hosts.login(conn_id, password) {
        tracing::info!("Host logged in on connection {}", conn_id);
        Some(session.host_state_update())
    } else {
        tracing::warn!("Rejected host login from connection {}", conn_id);
        Some(ServerMessage::LoginError {
            message: "Wrong password".to_string(),
        })
    }
}

/// Admin commands in the wrong phase are no-ops; just note them in the log
fn log_ignored(result: Result<(), GameError>) -> Option<ServerMessage> {
    if let Err(e) = result {
        tracing::debug!("Admin command ignored: {}", e);
    }
    None
}

pub fn handle_start_round(session: &mut GameSession) -> Option<ServerMessage> {
    tracing::info!("Host starting round");
    log_ignored(session.start_round())
}

pub fn handle_show_leaderboard(session: &mut GameSession) -> Option<ServerMessage> {
    tracing::info!("Host showing leaderboard");
    log_ignored(session.show_leaderboard())
}

pub fn handle_next_round(session: &mut GameSession) -> Option<ServerMessage> {
    tracing::info!("Host advancing to next round");
    log_ignored(session.next_round())
}

pub fn handle_hard_reset(session: &mut GameSession) -> Option<ServerMessage> {
    tracing::info!("Host requested hard reset");
    session.hard_reset();
    None
}
