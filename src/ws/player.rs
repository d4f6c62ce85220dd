//! Player message handlers

use crate::protocol::ServerMessage;
use crate::state::GameSession;
use crate::types::{ConnectionId, SessionId};

pub fn handle_join(
    session: &mut GameSession,
    conn_id: &ConnectionId,
    name: &str,
    session_id: &SessionId,
) -> Option<ServerMessage> {
    if session_id.trim().is_empty() {
        tracing::debug!("Join without session id from {}, ignoring", conn_id);
        return None;
    }
    session.join(conn_id, name, session_id);
    None
}

pub fn handle_submit_vote(
    session: &mut GameSession,
    conn_id: &ConnectionId,
    choice: &str,
    session_id: &SessionId,
) -> Option<ServerMessage> {
    match session.submit_vote(conn_id, choice, session_id) {
        Ok(choice) => tracing::debug!("Vote {} accepted from {}", choice.label(), conn_id),
        // Rejected votes are silent; the client just never gets vote_registered
        Err(e) => tracing::debug!("Vote from {} dropped: {}", conn_id, e),
    }
    None
}
