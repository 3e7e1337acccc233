use super::{lock, AppState, GameSession};
use crate::broadcast::{publish, GameEvent};
use crate::error::{GameError, GameResult};
use crate::types::*;

impl GameSession {
    /// Whose name goes into the next question. Advances the turn counter, so
    /// players who join mid-game are picked up on the next lap.
    fn next_player_name(&mut self) -> String {
        let players = &self.game.players;
        let name = self
            .game
            .next_player_index
            .checked_rem(players.len())
            .and_then(|index| players.get(index))
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.game.next_player_index += 1;
        name
    }

    /// Append a new round with a fresh question
    pub(super) fn start_round(&mut self) -> GameResult<Round> {
        let player_name = self.next_player_name();
        let question = self.deck.draw(&player_name)?;

        let round = Round {
            id: ulid::Ulid::new().to_string(),
            number: self.game.rounds.len() as u32 + 1,
            question,
            answers: Vec::new(),
            vote_count: 0,
        };
        self.game.rounds.push(round.clone());

        tracing::info!(
            "Started round {} ({}) in game {}",
            round.number,
            round.id,
            self.game.id
        );
        publish(
            &self.events,
            GameEvent::RoundStarted {
                round_id: round.id.clone(),
                number: round.number,
            },
        );
        Ok(round)
    }

    pub(super) fn require_member(&self, player_id: &str) -> GameResult<GamePlayer> {
        self.game
            .player(player_id)
            .cloned()
            .ok_or_else(|| GameError::PlayerNotInGame {
                game_id: self.game.id.clone(),
                player_id: player_id.to_string(),
            })
    }

    pub(super) fn require_round(&self, round_id: &str) -> GameResult<&Round> {
        self.game
            .round(round_id)
            .ok_or_else(|| GameError::RoundNotFound(round_id.to_string()))
    }
}

impl AppState {
    /// Start the next round of a game.
    ///
    /// This is also the force-advance entry point for callers whose wait for
    /// a quorum timed out.
    pub fn create_new_round(&self, game_id: &str) -> GameResult<Round> {
        self.with_session(game_id, |session| session.start_round())
    }

    /// Record a player's answer for a round.
    ///
    /// A second answer from the same player replaces the text of the first
    /// one and keeps its id.
    pub fn add_answer(
        &self,
        game_id: &str,
        player_id: &str,
        round_id: &str,
        text: &str,
    ) -> GameResult<Answer> {
        let session = self.session(game_id)?;
        self.require_player(player_id)?;

        let mut session = lock(&session);
        let owner = session.require_member(player_id)?;
        let player_count = session.game.players.len();
        let now = chrono::Utc::now().to_rfc3339();

        let round = session
            .game
            .round_mut(round_id)
            .ok_or_else(|| GameError::RoundNotFound(round_id.to_string()))?;

        let answer = match round.answers.iter_mut().find(|a| a.owner.id == player_id) {
            Some(existing) => {
                existing.text = text.to_string();
                existing.submitted_at = now;
                tracing::debug!("Replaced answer {} in round {}", existing.id, round_id);
                existing.clone()
            }
            None => {
                let answer = Answer {
                    id: ulid::Ulid::new().to_string(),
                    text: text.to_string(),
                    owner,
                    voters: Vec::new(),
                    submitted_at: now,
                };
                round.answers.push(answer.clone());
                tracing::debug!("Added answer {} in round {}", answer.id, round_id);
                answer
            }
        };

        if round.answers.len() == player_count {
            publish(
                &session.events,
                GameEvent::AllAnswered {
                    round_id: round_id.to_string(),
                },
            );
        }

        Ok(answer)
    }

    /// True once every player currently in the game has answered the round
    pub fn all_players_answered(&self, game_id: &str, round_id: &str) -> GameResult<bool> {
        self.with_session(game_id, |session| {
            let round = session.require_round(round_id)?;
            Ok(round.answers.len() == session.game.players.len())
        })
    }

    /// Answers a player may vote for: everything except their own
    pub fn choices_for(
        &self,
        game_id: &str,
        round_id: &str,
        player_id: &str,
    ) -> GameResult<Vec<Answer>> {
        self.with_session(game_id, |session| {
            let round = session.require_round(round_id)?;
            Ok(round
                .answers
                .iter()
                .filter(|a| a.owner.id != player_id)
                .cloned()
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn two_player_game(state: &AppState) -> (Game, Player, Player) {
        let alice = state.create_player("Alice");
        let bob = state.create_player("Bob");
        let game = state.create_game("pw", &alice.id).unwrap();
        let game = state.join_game(&game.password, &bob.id).unwrap();
        (game, alice, bob)
    }

    #[test]
    fn test_round_ids_are_unique() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let game = state.create_game("pw", &alice.id).unwrap();

        for _ in 0..20 {
            state.create_new_round(&game.id).unwrap();
        }

        let game = state.get_game(&game.id).unwrap();
        assert_eq!(game.rounds.len(), 21);
        let ids: HashSet<_> = game.rounds.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), 21);
        let numbers: Vec<u32> = game.rounds.iter().map(|r| r.number).collect();
        assert_eq!(numbers, (1..=21).collect::<Vec<_>>());
    }

    #[test]
    fn test_turn_rotation_follows_join_order() {
        let state = AppState::with_questions(
            GameConfig::default(),
            crate::questions::QuestionBank::from_templates(vec![
                "Q [player's name]".to_string()
            ]),
        );
        let alice = state.create_player("Alice");
        let bob = state.create_player("Bob");
        let game = state.create_game("pw", &alice.id).unwrap();
        assert_eq!(game.rounds[0].question, "Q Alice");

        state.join_game("pw", &bob.id).unwrap();
        // counter is 1, two players -> Bob
        assert_eq!(state.create_new_round(&game.id).unwrap().question, "Q Bob");
        assert_eq!(state.create_new_round(&game.id).unwrap().question, "Q Alice");

        let carol = state.create_player("Carol");
        state.join_game("pw", &carol.id).unwrap();
        // counter is 3, three players -> Alice again, then Bob, Carol
        assert_eq!(state.create_new_round(&game.id).unwrap().question, "Q Alice");
        assert_eq!(state.create_new_round(&game.id).unwrap().question, "Q Bob");
        assert_eq!(state.create_new_round(&game.id).unwrap().question, "Q Carol");
    }

    #[test]
    fn test_create_new_round_unknown_game() {
        let state = AppState::new();
        assert!(matches!(
            state.create_new_round("nope"),
            Err(GameError::GameNotFound(_))
        ));
    }

    #[test]
    fn test_exhaustion_under_fail_policy() {
        let config = GameConfig {
            exhaustion: ExhaustionPolicy::Fail,
            ..GameConfig::default()
        };
        let state = AppState::with_questions(
            config,
            crate::questions::QuestionBank::from_templates(vec![
                "One [player's name]".to_string(),
                "Two [player's name]".to_string(),
            ]),
        );
        let alice = state.create_player("Alice");
        let game = state.create_game("pw", &alice.id).unwrap();

        state.create_new_round(&game.id).unwrap();
        let err = state.create_new_round(&game.id).unwrap_err();
        assert_eq!(err, GameError::QuestionsExhausted);
        assert_eq!(state.get_game(&game.id).unwrap().rounds.len(), 2);
    }

    #[test]
    fn test_add_answer_and_quorum() {
        let state = AppState::new();
        let (game, alice, bob) = two_player_game(&state);
        let round_id = game.rounds[0].id.clone();

        state.add_answer(&game.id, &alice.id, &round_id, "a1").unwrap();
        assert!(!state.all_players_answered(&game.id, &round_id).unwrap());

        state.add_answer(&game.id, &bob.id, &round_id, "b1").unwrap();
        assert!(state.all_players_answered(&game.id, &round_id).unwrap());
    }

    #[test]
    fn test_resubmission_replaces_and_keeps_id() {
        let state = AppState::new();
        let (game, alice, _bob) = two_player_game(&state);
        let round_id = game.rounds[0].id.clone();

        let first = state.add_answer(&game.id, &alice.id, &round_id, "first").unwrap();
        let second = state.add_answer(&game.id, &alice.id, &round_id, "second").unwrap();

        assert_eq!(first.id, second.id);
        let round = state.get_latest_round(&game.id).unwrap();
        assert_eq!(round.answers.len(), 1);
        assert_eq!(round.answers[0].text, "second");
        assert!(!state.all_players_answered(&game.id, &round_id).unwrap());
    }

    #[test]
    fn test_add_answer_errors() {
        let state = AppState::new();
        let (game, alice, _bob) = two_player_game(&state);
        let round_id = game.rounds[0].id.clone();
        let outsider = state.create_player("Eve");

        assert!(matches!(
            state.add_answer("nope", &alice.id, &round_id, "x"),
            Err(GameError::GameNotFound(_))
        ));
        assert!(matches!(
            state.add_answer(&game.id, "ghost", &round_id, "x"),
            Err(GameError::PlayerNotFound(_))
        ));
        assert!(matches!(
            state.add_answer(&game.id, &outsider.id, &round_id, "x"),
            Err(GameError::PlayerNotInGame { .. })
        ));
        assert!(matches!(
            state.add_answer(&game.id, &alice.id, "no-round", "x"),
            Err(GameError::RoundNotFound(_))
        ));
        assert!(matches!(
            state.all_players_answered(&game.id, "no-round"),
            Err(GameError::RoundNotFound(_))
        ));
    }

    #[test]
    fn test_answer_quorum_tracks_current_player_count() {
        let state = AppState::new();
        let (game, alice, bob) = two_player_game(&state);
        let round_id = game.rounds[0].id.clone();

        state.add_answer(&game.id, &bob.id, &round_id, "b").unwrap();
        state.add_answer(&game.id, &alice.id, &round_id, "a").unwrap();
        assert!(state.all_players_answered(&game.id, &round_id).unwrap());

        let carol = state.create_player("Carol");
        state.join_game("pw", &carol.id).unwrap();
        assert!(!state.all_players_answered(&game.id, &round_id).unwrap());
    }

    #[test]
    fn test_choices_exclude_own_answer() {
        let state = AppState::new();
        let (game, alice, bob) = two_player_game(&state);
        let round_id = game.rounds[0].id.clone();

        state.add_answer(&game.id, &alice.id, &round_id, "a1").unwrap();
        state.add_answer(&game.id, &bob.id, &round_id, "b1").unwrap();

        let choices = state.choices_for(&game.id, &round_id, &alice.id).unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].text, "b1");
        assert_eq!(choices[0].owner.id, bob.id);
    }

    #[tokio::test]
    async fn test_all_answered_event() {
        let state = AppState::new();
        let (game, alice, bob) = two_player_game(&state);
        let round_id = game.rounds[0].id.clone();
        let mut rx = state.subscribe(&game.id).unwrap();

        state.add_answer(&game.id, &alice.id, &round_id, "a1").unwrap();
        state.add_answer(&game.id, &bob.id, &round_id, "b1").unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            GameEvent::AllAnswered {
                round_id: round_id.clone()
            }
        );
    }
}
