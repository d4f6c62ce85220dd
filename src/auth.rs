//! Shared-secret authentication for host connections

use crate::types::ConnectionId;
use std::collections::HashSet;

/// Tracks which connections have logged in as host
#[derive(Debug, Clone, Default)]
pub struct HostAuthority {
    /// Shared host password (None = auth disabled)
    password: Option<String>,
    authorized: HashSet<ConnectionId>,
}

impl HostAuthority {
    pub fn new(password: Option<String>) -> Self {
        let password = password
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if password.is_some() {
            tracing::info!("Host authentication enabled");
        } else {
            tracing::warn!("HOST_PASSWORD not set - any password is accepted for host login!");
        }

        Self {
            password,
            authorized: HashSet::new(),
        }
    }

    /// Check if authentication is enabled
    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    /// Validate a password
    pub fn validate(&self, password: &str) -> bool {
        match &self.password {
            Some(p) => constant_time_eq(p.as_bytes(), password.as_bytes()),
            None => true, // Auth disabled, allow all
        }
    }

    /// Attempt a login; on success the connection is authorized until it disconnects
    pub fn login(&mut self, conn_id: &ConnectionId, password: &str) -> bool {
        if !self.validate(password) {
            return false;
        }
        self.authorized.insert(conn_id.clone());
        true
    }

    pub fn is_authorized(&self, conn_id: &ConnectionId) -> bool {
        self.authorized.contains(conn_id)
    }

    /// Forget a connection (called on disconnect)
    pub fn revoke(&mut self, conn_id: &ConnectionId) -> bool {
        self.authorized.remove(conn_id)
    }

    pub fn authorized_connections(&self) -> impl Iterator<Item = &ConnectionId> {
        self.authorized.iter()
    }
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
