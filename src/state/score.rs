use super::GameSession;
use crate::protocol::{PlayerDataUpdate, RoundOutcome, ServerMessage};
use crate::types::*;

impl GameSession {
    /// Award points for the round and tell each connected player how they did.
    ///
    /// A player who never voted counts as wrong. Delivery is best-effort:
    /// disconnected players catch up on their next join.
    pub fn apply_round_scores(&mut self, correct: Choice) {
        let points = self.config.points_per_correct;
        let mut updates = Vec::new();

        for player in self.players.iter_mut() {
            let is_correct = player.current_vote == Some(correct);
            if is_correct {
                player.score = player.score.saturating_add(points);
            }

            if let Some(conn_id) = &player.connection {
                updates.push((
                    conn_id.clone(),
                    PlayerDataUpdate {
                        score: Some(player.score),
                        my_vote: None,
                        round_result: Some(if is_correct {
                            RoundOutcome::Correct
                        } else {
                            RoundOutcome::Wrong
                        }),
                    },
                ));
            }
        }

        for (conn_id, update) in updates {
            self.send_to(&conn_id, ServerMessage::PlayerDataUpdate(update));
        }
    }

    /// Players by cumulative score, highest first. Ties keep join order.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        // sort_by is stable
        players.sort_by(|a, b| b.score.cmp(&a.score));

        players
            .into_iter()
            .take(limit)
            .map(|p| LeaderboardEntry {
                name: p.display_name.clone(),
                score: p.score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::broadcast::Recipient;

    #[tokio::test]
    async fn test_correct_vote_scores_and_abstainer_is_wrong() {
        let (mut session, _rx) = session();
        session.join(&"c1".to_string(), "Alice", &"a".to_string());
        session.join(&"c2".to_string(), "Bob", &"b".to_string());
        session.join(&"c3".to_string(), "Cara", &"c".to_string());
        session.players.get_mut(&"a".to_string()).unwrap().current_vote = Some(Choice::Ai);
        session.players.get_mut(&"b".to_string()).unwrap().current_vote = Some(Choice::Real);
        session.drain_outbox();

        session.apply_round_scores(Choice::Ai);

        assert_eq!(session.players.get(&"a".to_string()).unwrap().score, 100);
        assert_eq!(session.players.get(&"b".to_string()).unwrap().score, 0);
        assert_eq!(session.players.get(&"c".to_string()).unwrap().score, 0);

        let outbox = session.drain_outbox();
        assert_eq!(outbox.len(), 3);
        let outcome_for = |conn: &str| {
            outbox
                .iter()
                .find(|o| o.to == Recipient::Connection(conn.to_string()))
                .and_then(|o| match &o.msg {
                    ServerMessage::PlayerDataUpdate(update) => update.round_result,
                    _ => None,
                })
        };
        assert_eq!(outcome_for("c1"), Some(RoundOutcome::Correct));
        assert_eq!(outcome_for("c2"), Some(RoundOutcome::Wrong));
        assert_eq!(outcome_for("c3"), Some(RoundOutcome::Wrong));
    }

    #[tokio::test]
    async fn test_disconnected_player_scores_without_message() {
        let (mut session, _rx) = session();
        let conn = "c1".to_string();
        session.join(&conn, "Alice", &"a".to_string());
        session.players.get_mut(&"a".to_string()).unwrap().current_vote = Some(Choice::Real);
        session.disconnect(&conn);
        session.drain_outbox();

        session.apply_round_scores(Choice::Real);

        assert_eq!(session.players.get(&"a".to_string()).unwrap().score, 100);
        assert!(session.drain_outbox().is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_sorted_with_stable_ties() {
        let (mut session, _rx) = session();
        for (sid, name, score) in [
            ("1", "First", 100),
            ("2", "Second", 300),
            ("3", "Third", 100),
            ("4", "Fourth", 0),
        ] {
            session.join(&format!("c{}", sid), name, &sid.to_string());
            session.players.get_mut(&sid.to_string()).unwrap().score = score;
        }

        let board = session.leaderboard(10);
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First", "Third", "Fourth"]);

        let top2 = session.leaderboard(2);
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[1].name, "First");
    }
}
