//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Host authorization is checked here, then dispatched to role-specific handler modules.

use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::GameSession;
use crate::types::ConnectionId;

use super::{host, player};

/// Macro to check host authorization and silently drop the command if unauthorized
macro_rules! check_host {
    ($session:expr, $conn_id:expr, $action:expr) => {
        if !$session.hosts.is_authorized($conn_id) {
            tracing::warn!(
                "Ignoring {} from connection {}: {}",
                $action,
                $conn_id,
                GameError::UnauthorizedAdminCommand
            );
            return None;
        }
    };
}

/// Handle a client message and return an optional direct reply.
///
/// Everything else the command causes is queued on the session's outbox.
pub fn handle_message(
    session: &mut GameSession,
    conn_id: &ConnectionId,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    match msg {
        // Player messages
        ClientMessage::Join { name, session_id } => {
            player::handle_join(session, conn_id, &name, &session_id)
        }

        ClientMessage::SubmitVote { choice, session_id } => {
            player::handle_submit_vote(session, conn_id, &choice, &session_id)
        }

        ClientMessage::RequestState => Some(session.state_update()),

        ClientMessage::HostLogin { password } => host::handle_login(session, conn_id, &password),

        // Host-only commands (authorization checked before dispatch)
        ClientMessage::AdminStartRound => {
            check_host!(session, conn_id, "admin_start_round");
            host::handle_start_round(session)
        }

        ClientMessage::AdminShowLeaderboard => {
            check_host!(session, conn_id, "admin_show_leaderboard");
            host::handle_show_leaderboard(session)
        }

        ClientMessage::AdminNextRound => {
            check_host!(session, conn_id, "admin_next_round");
            host::handle_next_round(session)
        }

        ClientMessage::AdminHardReset => {
            check_host!(session, conn_id, "admin_hard_reset");
            host::handle_hard_reset(session)
        }
    }
}
