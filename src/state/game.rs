use super::GameSession;
use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::types::*;

impl GameSession {
    fn require_phase(&self, command: &'static str, phase: GamePhase) -> Result<(), GameError> {
        if self.game.phase != phase {
            return Err(GameError::InvalidCommandForPhase {
                command,
                phase: self.game.phase,
            });
        }
        Ok(())
    }

    /// LOBBY -> QUESTION
    pub fn start_round(&mut self) -> Result<(), GameError> {
        self.require_phase("admin_start_round", GamePhase::Lobby)?;
        self.begin_round(self.game.round_index)
    }

    /// Open round `index`: fresh tally, votes cleared, countdown armed
    fn begin_round(&mut self, index: usize) -> Result<(), GameError> {
        let round = self
            .catalog
            .get(index)
            .map(RoundContent::from)
            .ok_or(GameError::RoundDataMissing(index))?;
        let duration = self.config.round_seconds;

        self.game.phase = GamePhase::Question;
        self.game.round_index = index;
        self.game.tally = VoteTally::new();
        self.game.seconds_remaining = Some(duration);
        self.game.last_result = None;
        self.players.clear_votes();
        self.timer.arm();

        tracing::info!("Starting round {} of {}", index + 1, self.catalog.len());

        self.broadcast_to_all(ServerMessage::NewRound { round, duration });
        self.broadcast_state();
        Ok(())
    }

    /// One second of the countdown has passed
    pub fn on_timer_tick(&mut self, generation: u64) {
        if !self.timer.is_current(generation) {
            tracing::debug!("Ignoring stale timer tick (generation {})", generation);
            return;
        }
        if self.game.phase != GamePhase::Question {
            self.timer.cancel();
            return;
        }

        let remaining = self.game.seconds_remaining.unwrap_or(0).saturating_sub(1);
        self.game.seconds_remaining = Some(remaining);
        self.broadcast_to_all(ServerMessage::TimerUpdate {
            seconds_remaining: remaining,
        });

        if remaining == 0 {
            self.timer.cancel();
            if let Err(e) = self.reveal() {
                tracing::error!(
                    "Failed to compute result for round {}: {}",
                    self.game.round_index + 1,
                    e
                );
            }
        }
    }

    /// QUESTION -> REVEAL: freeze the tally, score, cache and publish the result.
    /// On error nothing is changed and the game stays in QUESTION.
    pub fn reveal(&mut self) -> Result<(), GameError> {
        self.require_phase("reveal", GamePhase::Question)?;

        let index = self.game.round_index;
        let round = self
            .catalog
            .get(index)
            .ok_or(GameError::RoundDataMissing(index))?;
        let correct = Choice::resolve_answer(&round.answer)
            .ok_or_else(|| GameError::UnresolvableAnswer(round.answer.clone()))?;

        self.timer.cancel();
        self.game.phase = GamePhase::Reveal;
        self.game.seconds_remaining = None;

        self.apply_round_scores(correct);

        let result = RoundResult {
            correct_answer: correct,
            stats: self.game.tally.clone(),
            leaderboard: self.leaderboard(self.config.round_leaderboard_size),
        };
        self.game.last_result = Some(CachedResult::Round(result.clone()));

        tracing::info!(
            "Round {} revealed: answer {}, tally {:?}",
            index + 1,
            correct.label(),
            result.stats
        );

        self.broadcast_to_all(ServerMessage::RoundResult { result });
        self.broadcast_state();
        self.broadcast_host_state();
        Ok(())
    }

    /// REVEAL -> LEADERBOARD (the result already carries the leaderboard)
    pub fn show_leaderboard(&mut self) -> Result<(), GameError> {
        self.require_phase("admin_show_leaderboard", GamePhase::Reveal)?;
        self.game.phase = GamePhase::Leaderboard;
        self.broadcast_state();
        Ok(())
    }

    /// LEADERBOARD -> QUESTION for the next round, or GAME_OVER after the last one
    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.require_phase("admin_next_round", GamePhase::Leaderboard)?;

        let next = self.game.round_index + 1;
        if next < self.catalog.len() {
            return self.begin_round(next);
        }

        self.timer.cancel();
        self.game.phase = GamePhase::GameOver;
        self.game.seconds_remaining = None;
        let leaderboard = self.leaderboard(self.config.final_leaderboard_size);
        tracing::info!(
            "Game over after {} rounds, winner: {:?}",
            self.catalog.len(),
            leaderboard.first().map(|e| &e.name)
        );
        self.game.last_result = Some(CachedResult::Final { leaderboard });

        self.broadcast_state();
        self.broadcast_host_state();
        Ok(())
    }

    /// Any phase -> LOBBY, forgetting every player
    pub fn hard_reset(&mut self) {
        self.timer.cancel();
        self.game = Game::default();
        self.players.clear();

        tracing::info!("Game hard reset");

        self.broadcast_to_all(ServerMessage::GameResetEvent);
        self.broadcast_state();
        self.broadcast_host_state();
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_start_round_resets_round_state() {
        let (mut session, _rx) = session();
        let sid = "s1".to_string();
        session.join(&"c1".to_string(), "Alice", &sid);
        session.players.get_mut(&sid).unwrap().current_vote = Some(Choice::Ai);
        session.game.tally.increment(Choice::Ai);
        session.drain_outbox();

        session.start_round().unwrap();

        assert_eq!(session.game.phase, GamePhase::Question);
        assert_eq!(session.game.tally, VoteTally::new());
        assert_eq!(session.game.seconds_remaining, Some(15));
        assert!(session.players.get(&sid).unwrap().current_vote.is_none());
        assert!(session.timer.is_running());

        let broadcasts = messages_for_all(&session.drain_outbox())
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        match &broadcasts[0] {
            ServerMessage::NewRound { round, duration } => {
                assert_eq!(round.ordinal, 0);
                assert_eq!(round.media, "/assets/q1.webp");
                assert_eq!(*duration, 15);
            }
            other => panic!("Expected NewRound, got {:?}", other),
        }
        assert!(matches!(broadcasts[1], ServerMessage::StateUpdate { .. }));
    }

    #[tokio::test]
    async fn test_start_round_twice_is_rejected() {
        let (mut session, _rx) = session();
        session.start_round().unwrap();
        let generation = session.timer.generation();

        let result = session.start_round();

        assert!(matches!(
            result,
            Err(GameError::InvalidCommandForPhase {
                phase: GamePhase::Question,
                ..
            })
        ));
        // The running countdown was not re-armed
        assert_eq!(session.timer.generation(), generation);
    }

    #[tokio::test]
    async fn test_start_round_without_round_data() {
        let (mut session, _rx) = session();
        session.game.round_index = 99;

        let result = session.start_round();

        assert_eq!(result, Err(GameError::RoundDataMissing(99)));
        assert_eq!(session.game.phase, GamePhase::Lobby);
        assert!(!session.timer.is_running());
        assert!(session.drain_outbox().is_empty());
    }

    #[tokio::test]
    async fn test_ticks_count_down_then_reveal_once() {
        let (mut session, _rx) = session();
        session.start_round().unwrap();
        session.drain_outbox();
        let generation = session.timer.generation();

        for _ in 0..14 {
            session.on_timer_tick(generation);
        }
        assert_eq!(session.game.phase, GamePhase::Question);
        assert_eq!(session.game.seconds_remaining, Some(1));

        session.on_timer_tick(generation);
        assert_eq!(session.game.phase, GamePhase::Reveal);
        assert_eq!(session.game.seconds_remaining, None);
        assert!(!session.timer.is_running());

        // Ticks already queued behind the expiry change nothing
        session.on_timer_tick(generation);
        session.on_timer_tick(generation);

        let outbox = session.drain_outbox();
        let results = outbox
            .iter()
            .filter(|o| matches!(o.msg, ServerMessage::RoundResult { .. }))
            .count();
        let timer_updates = outbox
            .iter()
            .filter(|o| matches!(o.msg, ServerMessage::TimerUpdate { .. }))
            .count();
        assert_eq!(results, 1);
        assert_eq!(timer_updates, 15);
    }

    #[tokio::test]
    async fn test_reveal_caches_result_with_legacy_answer() {
        let (mut session, _rx) = session();
        // Built-in round 1 is labelled "HUMAN"
        let sid = "s1".to_string();
        session.join(&"c1".to_string(), "Alice", &sid);
        session.start_round().unwrap();
        session.submit_vote(&"c1".to_string(), "real", &sid).unwrap();

        expire_timer(&mut session);

        match &session.game.last_result {
            Some(CachedResult::Round(result)) => {
                assert_eq!(result.correct_answer, Choice::Real);
                assert_eq!(result.stats.get(Choice::Real), 1);
                assert_eq!(result.leaderboard[0].score, 100);
            }
            other => panic!("Expected round result, got {:?}", other),
        }
        assert!(session.public_state().result.is_some());
    }

    #[tokio::test]
    async fn test_failed_reveal_keeps_question_phase() {
        let (mut session, _rx) = session();
        let sid = "s1".to_string();
        session.join(&"c1".to_string(), "Alice", &sid);
        session.start_round().unwrap();
        session.submit_vote(&"c1".to_string(), "AI", &sid).unwrap();
        // Round data vanished under a running round
        session.game.round_index = 99;

        expire_timer(&mut session);

        assert_eq!(session.game.phase, GamePhase::Question);
        assert!(session.game.last_result.is_none());
        assert!(!session.timer.is_running());
        assert_eq!(session.players.get(&sid).unwrap().score, 0);

        // Hard reset recovers
        session.hard_reset();
        assert_eq!(session.game.phase, GamePhase::Lobby);
    }

    #[tokio::test]
    async fn test_show_leaderboard_only_from_reveal() {
        let (mut session, _rx) = session();
        session.start_round().unwrap();

        assert!(session.show_leaderboard().is_err());
        assert_eq!(session.game.phase, GamePhase::Question);

        expire_timer(&mut session);
        session.show_leaderboard().unwrap();
        assert_eq!(session.game.phase, GamePhase::Leaderboard);
        // Result survives into the leaderboard phase
        assert!(session.public_state().result.is_some());
    }

    #[tokio::test]
    async fn test_next_round_advances_index() {
        let (mut session, _rx) = session();
        session.start_round().unwrap();
        expire_timer(&mut session);
        session.show_leaderboard().unwrap();

        session.next_round().unwrap();

        assert_eq!(session.game.phase, GamePhase::Question);
        assert_eq!(session.game.round_index, 1);
        assert!(session.game.last_result.is_none());
        assert!(session.timer.is_running());
    }

    #[tokio::test]
    async fn test_next_round_after_last_is_game_over() {
        let (mut session, _rx) = session();
        for i in 0..12 {
            let sid = format!("s{}", i);
            session.join(&format!("c{}", i), &format!("P{}", i), &sid);
            session.players.get_mut(&sid).unwrap().score = i * 10;
        }

        session.start_round().unwrap();
        for _ in 0..3 {
            expire_timer(&mut session);
            session.show_leaderboard().unwrap();
            session.next_round().unwrap();
        }

        assert_eq!(session.game.phase, GamePhase::GameOver);
        assert_eq!(session.game.round_index, 2);
        assert!(!session.timer.is_running());
        let board = session.public_state().result.unwrap();
        let board = board.leaderboard();
        assert_eq!(board.len(), 10);
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(board[0].name, "P11");

        // Terminal: further advances are ignored
        assert!(session.next_round().is_err());
        assert!(session.start_round().is_err());
    }

    #[tokio::test]
    async fn test_hard_reset_cancels_timer_and_ignores_stray_ticks() {
        let (mut session, _rx) = session();
        session.join(&"c1".to_string(), "Alice", &"s1".to_string());
        session.start_round().unwrap();
        let generation = session.timer.generation();
        session.on_timer_tick(generation);

        session.hard_reset();

        assert_eq!(session.game.phase, GamePhase::Lobby);
        assert_eq!(session.game.round_index, 0);
        assert!(session.players.is_empty());
        assert!(!session.timer.is_running());

        let outbox = session.drain_outbox();
        assert!(matches!(
            messages_for_all(&outbox)[0],
            ServerMessage::GameResetEvent
        ));

        for _ in 0..20 {
            session.on_timer_tick(generation);
        }
        assert_eq!(session.game.phase, GamePhase::Lobby);
        assert!(session.drain_outbox().is_empty());
    }

    #[tokio::test]
    async fn test_old_generation_ticks_ignored_after_new_round() {
        let (mut session, _rx) = session();
        session.start_round().unwrap();
        let old = session.timer.generation();
        session.hard_reset();
        session.start_round().unwrap();

        for _ in 0..20 {
            session.on_timer_tick(old);
        }

        assert_eq!(session.game.phase, GamePhase::Question);
        assert_eq!(session.game.seconds_remaining, Some(15));
    }
}
