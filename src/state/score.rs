use crate::error::GameResult;
use crate::state::AppState;
use crate::types::*;
use std::collections::HashMap;

impl AppState {
    /// Accumulated points per player. Players who never received a vote have
    /// no entry.
    pub fn get_score(&self, game_id: &str) -> GameResult<HashMap<PlayerId, u32>> {
        self.with_session(game_id, |session| Ok(session.game.score.clone()))
    }

    /// Every player of the game with their points, best first.
    ///
    /// Ties keep join order.
    pub fn leaderboard(&self, game_id: &str) -> GameResult<Vec<ScoreEntry>> {
        self.with_session(game_id, |session| {
            let game = &session.game;
            let mut entries: Vec<ScoreEntry> = game
                .players
                .iter()
                .map(|p| ScoreEntry {
                    player_id: p.id.clone(),
                    name: p.name.clone(),
                    points: game.score.get(&p.id).copied().unwrap_or(0),
                })
                .collect();

            // Stable sort, so equal scores stay in join order
            entries.sort_by(|a, b| b.points.cmp(&a.points));
            Ok(entries)
        })
    }
}
