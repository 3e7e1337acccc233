use super::{lock, AppState};
use crate::broadcast::{publish, GameEvent};
use crate::error::{GameError, GameResult};

impl AppState {
    /// Record `player_id`'s vote for `answer_id`.
    ///
    /// Credits the answer's owner with one point and clears the voter's
    /// ready flag both in the game and in the player registry, so the voter
    /// has to signal ready again before the next round. A player gets one
    /// vote per round; a second one is rejected and changes nothing.
    pub fn add_choice(
        &self,
        game_id: &str,
        player_id: &str,
        round_id: &str,
        answer_id: &str,
    ) -> GameResult<()> {
        let session = self.session(game_id)?;
        self.require_player(player_id)?;

        let mut session = lock(&session);
        let voter = session.require_member(player_id)?;
        let player_count = session.game.players.len();

        let round = session
            .game
            .round_mut(round_id)
            .ok_or_else(|| GameError::RoundNotFound(round_id.to_string()))?;

        let index = round
            .answers
            .iter()
            .position(|a| a.id == answer_id)
            .ok_or_else(|| GameError::AnswerNotFound(answer_id.to_string()))?;

        if round.has_voted(player_id) {
            tracing::warn!("Player {} tried to vote twice in round {}", player_id, round_id);
            return Err(GameError::AlreadyVoted {
                round_id: round_id.to_string(),
                player_id: player_id.to_string(),
            });
        }

        let answer = &mut round.answers[index];
        answer.voters.push(voter);
        let owner_id = answer.owner.id.clone();

        round.vote_count += 1;
        let all_voted = round.vote_count as usize == player_count;

        let points = {
            let entry = session.game.score.entry(owner_id.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        if let Some(p) = session.game.players.iter_mut().find(|p| p.id == player_id) {
            p.ready = false;
        }
        self.reset_player_ready(player_id);

        tracing::debug!(
            "Player {} voted for answer {} in round {}",
            player_id,
            answer_id,
            round_id
        );
        tracing::info!("Score update in game {}: {:?}", session.game.id, session.game.score);

        publish(
            &session.events,
            GameEvent::ScoreUpdated {
                player_id: owner_id,
                points,
            },
        );
        if all_voted {
            publish(
                &session.events,
                GameEvent::AllVoted {
                    round_id: round_id.to_string(),
                },
            );
        }

        Ok(())
    }

    /// True once every player currently in the game has voted in the round
    pub fn all_players_selected_choice(&self, game_id: &str, round_id: &str) -> GameResult<bool> {
        self.with_session(game_id, |session| {
            let round = session.require_round(round_id)?;
            Ok(round.vote_count as usize == session.game.players.len())
        })
    }
}
