use super::{lock, read, write, AppState, GameSession};
use crate::broadcast::{publish, GameEvent};
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Pick a join code for a game created without one
fn generate_password() -> String {
    petname::petname(2, "-").unwrap_or_else(|| ulid::Ulid::new().to_string().to_lowercase())
}

impl AppState {
    /// Create a game owned by `creator_id` and start its first round.
    ///
    /// Fails with `PasswordInUse` if an active game already uses `password`.
    /// A blank password is replaced by a generated join code.
    pub fn create_game(&self, password: &str, creator_id: &str) -> GameResult<Game> {
        let creator = self.require_player(creator_id)?;

        let password = if password.trim().is_empty() {
            generate_password()
        } else {
            password.to_string()
        };

        // Hold the registry write lock across the scan and the insert
        let mut games = write(&self.games);

        let collision = games.values().any(|session| {
            let session = lock(session);
            session.game.password == password && !session.game.is_complete
        });
        if collision {
            tracing::warn!("Refusing to create game, password {:?} in use", password);
            return Err(GameError::PasswordInUse(password));
        }

        let game = Game {
            id: ulid::Ulid::new().to_string(),
            password,
            players: vec![GamePlayer::from(&creator)],
            rounds: Vec::new(),
            is_complete: false,
            next_player_index: 0,
            score: HashMap::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let mut session = GameSession::new(
            game,
            self.questions.deck(self.config.exhaustion),
            self.config.event_buffer,
        );
        session.start_round()?;

        let game = session.game.clone();
        games.insert(game.id.clone(), Arc::new(Mutex::new(session)));

        tracing::info!(
            "Created game {} (password {:?}) for player {}",
            game.id,
            game.password,
            creator.id
        );
        Ok(game)
    }

    /// Join the active game that uses `password`.
    ///
    /// Joining a game the player is already part of changes nothing.
    pub fn join_game(&self, password: &str, player_id: &str) -> GameResult<Game> {
        let session = read(&self.games)
            .values()
            .find(|session| {
                let session = lock(session);
                session.game.password == password && !session.game.is_complete
            })
            .cloned()
            .ok_or_else(|| {
                tracing::error!("No active game for password {:?}", password);
                GameError::NoActiveGame(password.to_string())
            })?;

        let player = self.require_player(player_id)?;

        let mut session = lock(&session);
        // Completed between lookup and lock
        if session.game.is_complete {
            return Err(GameError::NoActiveGame(password.to_string()));
        }

        if session.game.has_player(player_id) {
            tracing::debug!("Player {} already in game {}", player_id, session.game.id);
            return Ok(session.game.clone());
        }

        session.game.players.push(GamePlayer::from(&player));
        tracing::info!(
            "Player {} ({}) joined game {}",
            player.id,
            player.name,
            session.game.id
        );
        publish(
            &session.events,
            GameEvent::PlayerJoined {
                player_id: player.id.clone(),
            },
        );

        Ok(session.game.clone())
    }

    pub fn get_game(&self, game_id: &str) -> GameResult<Game> {
        self.with_session(game_id, |session| Ok(session.game.clone()))
    }

    /// Get the most recently created round of a game
    pub fn get_latest_round(&self, game_id: &str) -> GameResult<Round> {
        self.with_session(game_id, |session| {
            session.game.latest_round().cloned().ok_or_else(|| {
                tracing::error!("Game {} has no rounds yet", game_id);
                GameError::NoRounds(game_id.to_string())
            })
        })
    }

    /// Mark a game complete, which frees its password for new games
    pub fn complete_game(&self, game_id: &str) -> GameResult<Game> {
        self.with_session(game_id, |session| {
            if !session.game.is_complete {
                session.game.is_complete = true;
                tracing::info!("Game {} completed", session.game.id);
                publish(
                    &session.events,
                    GameEvent::GameCompleted {
                        game_id: session.game.id.clone(),
                    },
                );
            }
            Ok(session.game.clone())
        })
    }

    /// Drop every completed game from the registry. Returns how many went.
    pub fn evict_completed_games(&self) -> usize {
        let mut games = write(&self.games);
        let before = games.len();
        games.retain(|_, session| !lock(session).game.is_complete);
        let evicted = before - games.len();
        if evicted > 0 {
            tracing::info!("Evicted {} completed games", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_game() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let game = state.create_game("secret", &alice.id).unwrap();

        assert_eq!(game.password, "secret");
        assert!(!game.is_complete);
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.players[0].id, alice.id);
        assert!(game.score.is_empty());

        // First round is created straight away, naming the creator
        assert_eq!(game.rounds.len(), 1);
        assert_eq!(game.rounds[0].number, 1);
        assert!(game.rounds[0].question.contains("Alice"));
        assert_eq!(game.next_player_index, 1);

        assert_eq!(state.get_game(&game.id).unwrap().id, game.id);
    }

    #[test]
    fn test_create_game_unknown_creator() {
        let state = AppState::new();
        let result = state.create_game("secret", "ghost");
        assert!(matches!(result, Err(GameError::PlayerNotFound(_))));
        assert!(read(&state.games).is_empty());
    }

    #[test]
    fn test_create_game_blank_password_generates_code() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let game = state.create_game("  ", &alice.id).unwrap();

        assert!(!game.password.trim().is_empty());
        let bob = state.create_player("Bob");
        let joined = state.join_game(&game.password, &bob.id).unwrap();
        assert_eq!(joined.id, game.id);
    }

    #[test]
    fn test_password_collision_until_complete() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let bob = state.create_player("Bob");

        let first = state.create_game("pw", &alice.id).unwrap();

        let err = state.create_game("pw", &bob.id).unwrap_err();
        assert_eq!(err, GameError::PasswordInUse("pw".to_string()));
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);

        // Same creator gets no special treatment
        assert!(state.create_game("pw", &alice.id).is_err());

        state.complete_game(&first.id).unwrap();
        let second = state.create_game("pw", &bob.id).unwrap();
        assert_ne!(second.id, first.id);
    }

    #[test]
    fn test_join_game_appends_snapshot() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let bob = state.create_player("Bob");
        let game = state.create_game("pw", &alice.id).unwrap();

        let joined = state.join_game("pw", &bob.id).unwrap();
        assert_eq!(joined.id, game.id);
        let ids: Vec<_> = joined.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![alice.id.as_str(), bob.id.as_str()]);
    }

    #[test]
    fn test_join_game_twice_is_noop() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let bob = state.create_player("Bob");
        state.create_game("pw", &alice.id).unwrap();

        state.join_game("pw", &bob.id).unwrap();
        let again = state.join_game("pw", &bob.id).unwrap();
        assert_eq!(again.players.len(), 2);
    }

    #[test]
    fn test_join_game_errors() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let game = state.create_game("pw", &alice.id).unwrap();

        assert!(matches!(
            state.join_game("wrong", &alice.id),
            Err(GameError::NoActiveGame(_))
        ));
        assert!(matches!(
            state.join_game("pw", "ghost"),
            Err(GameError::PlayerNotFound(_))
        ));

        state.complete_game(&game.id).unwrap();
        let bob = state.create_player("Bob");
        assert!(matches!(
            state.join_game("pw", &bob.id),
            Err(GameError::NoActiveGame(_))
        ));
    }

    #[test]
    fn test_join_picks_active_game_when_password_reused() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let bob = state.create_player("Bob");
        let old = state.create_game("pw", &alice.id).unwrap();
        state.complete_game(&old.id).unwrap();
        let new = state.create_game("pw", &alice.id).unwrap();

        let joined = state.join_game("pw", &bob.id).unwrap();
        assert_eq!(joined.id, new.id);
    }

    #[test]
    fn test_snapshot_is_independent_of_registry() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let game = state.create_game("pw", &alice.id).unwrap();

        write(&state.players).get_mut(&alice.id).unwrap().name = "Renamed".to_string();

        let game = state.get_game(&game.id).unwrap();
        assert_eq!(game.players[0].name, "Alice");
    }

    #[test]
    fn test_get_latest_round() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let game = state.create_game("pw", &alice.id).unwrap();

        let first = state.get_latest_round(&game.id).unwrap();
        assert_eq!(first.id, game.rounds[0].id);

        let second = state.create_new_round(&game.id).unwrap();
        assert_eq!(state.get_latest_round(&game.id).unwrap().id, second.id);

        assert!(matches!(
            state.get_latest_round("nope"),
            Err(GameError::GameNotFound(_))
        ));
    }

    #[test]
    fn test_evict_completed_games() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let done = state.create_game("one", &alice.id).unwrap();
        let live = state.create_game("two", &alice.id).unwrap();

        assert_eq!(state.evict_completed_games(), 0);
        state.complete_game(&done.id).unwrap();
        assert_eq!(state.evict_completed_games(), 1);

        assert!(state.get_game(&done.id).is_err());
        assert!(state.get_game(&live.id).is_ok());
    }
}
