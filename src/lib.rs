// Public API for integration tests and the server binary

pub mod auth;
pub mod broadcast;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod state;
pub mod timer;
pub mod types;
pub mod ws;
