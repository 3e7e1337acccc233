use super::{read, write, AppState};
use crate::error::{GameError, GameResult};
use crate::types::*;

impl AppState {
    /// Register a new player. Names do not have to be unique.
    pub fn create_player(&self, name: &str) -> Player {
        let player = Player {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            ready: false,
        };

        write(&self.players).insert(player.id.clone(), player.clone());
        tracing::info!("Created player {} ({})", player.id, player.name);
        player
    }

    /// Get the canonical registry record for a player
    pub fn get_player(&self, player_id: &str) -> Option<Player> {
        read(&self.players).get(player_id).cloned()
    }

    pub(super) fn require_player(&self, player_id: &str) -> GameResult<Player> {
        self.get_player(player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))
    }

    /// Clear a player's ready flag in the registry
    pub(super) fn reset_player_ready(&self, player_id: &str) {
        if let Some(player) = write(&self.players).get_mut(player_id) {
            player.ready = false;
        }
    }
}
