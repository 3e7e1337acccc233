use super::AppState;
use crate::error::{GameError, GameResult};

impl AppState {
    /// Mark a player ready for the next round.
    ///
    /// Runs entirely under the game's lock: when this signal makes every
    /// player ready, the next round is started and all flags are cleared, so
    /// concurrent signals can advance the game at most once. Returns whether a
    /// new round was started.
    pub fn player_ready(&self, game_id: &str, player_id: &str) -> GameResult<bool> {
        self.with_session(game_id, |session| {
            let game_id = session.game.id.clone();
            let player = session
                .game
                .players
                .iter_mut()
                .find(|p| p.id == player_id)
                .ok_or_else(|| GameError::PlayerNotInGame {
                    game_id: game_id.clone(),
                    player_id: player_id.to_string(),
                })?;
            player.ready = true;
            tracing::info!("Player {} is ready in game {}", player_id, game_id);

            if !session.game.all_players_ready() {
                tracing::debug!("Not all players ready in game {}", game_id);
                return Ok(false);
            }

            tracing::info!("All players ready in game {}, starting next round", game_id);
            session.start_round()?;
            for p in session.game.players.iter_mut() {
                p.ready = false;
            }
            Ok(true)
        })
    }

    /// Read-only check of every player's ready flag
    pub fn all_players_ready(&self, game_id: &str) -> GameResult<bool> {
        self.with_session(game_id, |session| Ok(session.game.all_players_ready()))
    }
}
