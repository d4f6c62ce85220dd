//! Process configuration read from the environment

use crate::types::GameConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    /// JSON round catalog (None = built-in demo rounds)
    pub rounds_file: Option<PathBuf>,
    pub host_password: Option<String>,
    pub game: GameConfig,
}

impl AppConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = GameConfig::default();

        let port = env_parse("PORT", DEFAULT_PORT);
        let static_dir = env_string("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static"));
        let rounds_file = env_string("ROUNDS_FILE").map(PathBuf::from);
        let host_password = env_string("HOST_PASSWORD");

        let mut round_seconds = env_parse("ROUND_SECONDS", defaults.round_seconds);
        if round_seconds == 0 {
            tracing::warn!("ROUND_SECONDS=0 would end rounds immediately, using 1");
            round_seconds = 1;
        }

        let mut vote_debounce_ms = env_parse("VOTE_DEBOUNCE_MS", defaults.vote_debounce_ms);
        if vote_debounce_ms < 0 {
            tracing::warn!("VOTE_DEBOUNCE_MS={} is negative, using 0", vote_debounce_ms);
            vote_debounce_ms = 0;
        }

        let game = GameConfig {
            round_seconds,
            points_per_correct: env_parse("POINTS_PER_CORRECT", defaults.points_per_correct),
            vote_debounce_ms,
            ..defaults
        };

        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            static_dir,
            rounds_file,
            host_password,
            game,
        }
    }
}

/// Non-empty, trimmed env var
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match env_string(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
