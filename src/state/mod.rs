mod game;
mod player;
mod ready;
mod round;
mod score;
mod vote;

use crate::broadcast::GameEvent;
use crate::error::{GameError, GameResult};
use crate::questions::{QuestionBank, QuestionDeck};
use crate::types::*;
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use tokio::sync::broadcast;

/// Everything the engine knows about one game.
///
/// Lives behind its own mutex so that every mutating operation on a game is
/// serialized while unrelated games never contend.
pub struct GameSession {
    pub game: Game,
    deck: QuestionDeck,
    events: broadcast::Sender<GameEvent>,
}

impl GameSession {
    fn new(game: Game, deck: QuestionDeck, event_buffer: usize) -> Self {
        let (events, _rx) = broadcast::channel(event_buffer.max(1));
        Self { game, deck, events }
    }
}

/// Shared application state
///
/// Lock order is always: `games` map, then a single game session, then
/// `players`. No lock is held across an await point.
#[derive(Clone)]
pub struct AppState {
    pub players: Arc<RwLock<HashMap<PlayerId, Player>>>,
    pub games: Arc<RwLock<HashMap<GameId, Arc<Mutex<GameSession>>>>>,
    pub questions: QuestionBank,
    pub config: GameConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_questions(config, QuestionBank::default())
    }

    pub fn with_questions(config: GameConfig, questions: QuestionBank) -> Self {
        Self {
            players: Arc::new(RwLock::new(HashMap::new())),
            games: Arc::new(RwLock::new(HashMap::new())),
            questions,
            config,
        }
    }

    /// Subscribe to push notifications for one game
    pub fn subscribe(&self, game_id: &str) -> GameResult<broadcast::Receiver<GameEvent>> {
        let session = self.session(game_id)?;
        let rx = lock(&session).events.subscribe();
        Ok(rx)
    }

    fn session(&self, game_id: &str) -> GameResult<Arc<Mutex<GameSession>>> {
        read(&self.games)
            .get(game_id)
            .cloned()
            .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))
    }

    /// Run `f` with exclusive access to one game
    fn with_session<T>(
        &self,
        game_id: &str,
        f: impl FnOnce(&mut GameSession) -> GameResult<T>,
    ) -> GameResult<T> {
        let session = self.session(game_id)?;
        let mut guard = lock(&session);
        f(&mut guard)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// A panic while holding one of these locks leaves plain data behind; keep
// serving it rather than poisoning every later caller.

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_empty() {
        let state = AppState::new();
        assert!(read(&state.players).is_empty());
        assert!(read(&state.games).is_empty());
        assert!(!state.questions.is_empty());
    }

    #[test]
    fn test_cloned_state_shares_registries() {
        let state = AppState::new();
        let other = state.clone();
        let player = state.create_player("Alice");
        assert_eq!(other.get_player(&player.id), Some(player));
    }

    #[tokio::test]
    async fn test_subscribe_receives_round_started() {
        let state = AppState::new();
        let alice = state.create_player("Alice");
        let game = state.create_game("pw", &alice.id).unwrap();

        let mut rx = state.subscribe(&game.id).unwrap();
        let round = state.create_new_round(&game.id).unwrap();

        match rx.recv().await.unwrap() {
            GameEvent::RoundStarted { round_id, number } => {
                assert_eq!(round_id, round.id);
                assert_eq!(number, 2);
            }
            other => panic!("Expected RoundStarted, got {:?}", other),
        }
    }

    #[test]
    fn test_subscribe_unknown_game() {
        let state = AppState::new();
        assert!(matches!(
            state.subscribe("nope"),
            Err(GameError::GameNotFound(_))
        ));
    }
}
