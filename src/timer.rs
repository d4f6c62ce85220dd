//! Round countdown.
//!
//! The timer itself holds no game state: a background task posts a
//! `TimerTick` into the game loop once per second, and the session does the
//! counting. Every arm bumps the generation so ticks from a cancelled timer
//! that are already queued can be recognised and dropped.

use crate::engine::Event;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct RoundTimer {
    events: mpsc::UnboundedSender<Event>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl RoundTimer {
    pub fn new(events: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            events,
            handle: None,
            generation: 0,
        }
    }

    /// Start ticking, cancelling any previous countdown first.
    /// Returns the generation carried by the new timer's ticks.
    pub fn arm(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let events = self.events.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                if events.send(Event::TimerTick { generation }).is_err() {
                    // Game loop is gone
                    break;
                }
            }
        }));

        tracing::debug!("Round timer armed (generation {})", generation);
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Round timer cancelled (generation {})", self.generation);
        }
    }

    /// True if a tick with this generation comes from the live timer
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
