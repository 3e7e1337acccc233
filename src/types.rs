use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque ID types for type safety
pub type GameId = String;
pub type RoundId = String;
pub type AnswerId = String;
pub type PlayerId = String;

/// What a question deck does once every template has been drawn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Shuffle the full corpus again and keep drawing
    #[default]
    Reshuffle,
    /// Replay the previous shuffle order
    Cycle,
    /// Refuse to draw (`GameError::QuestionsExhausted`)
    Fail,
}

impl std::str::FromStr for ExhaustionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reshuffle" => Ok(Self::Reshuffle),
            "cycle" => Ok(Self::Cycle),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown exhaustion policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// How long the HTTP layer waits for every answer before moving on
    pub answer_timeout_secs: u64,
    /// How long the HTTP layer waits for every vote before moving on
    pub vote_timeout_secs: u64,
    pub exhaustion: ExhaustionPolicy,
    /// Capacity of each game's event channel
    pub event_buffer: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            answer_timeout_secs: 60,
            vote_timeout_secs: 60,
            exhaustion: ExhaustionPolicy::Reshuffle,
            event_buffer: 64,
        }
    }
}

/// Canonical player record held by the player registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
}

/// A player as seen from inside one game.
///
/// Copied by value when the player joins (or creates) the game. Changes made
/// here stay here; the only write-back to the registry is the ready reset
/// performed when a vote is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamePlayer {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
}

impl From<&Player> for GamePlayer {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            ready: player.ready,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    /// Human-shareable join code
    pub password: String,
    pub players: Vec<GamePlayer>,
    pub rounds: Vec<Round>,
    pub is_complete: bool,
    /// Turn counter; `next_player_index % players.len()` names the next question
    pub next_player_index: usize,
    /// player id -> points, entries appear on the first vote received
    pub score: HashMap<PlayerId, u32>,
    pub created_at: String,
}

impl Game {
    pub fn player(&self, player_id: &str) -> Option<&GamePlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    pub fn round(&self, round_id: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    pub fn round_mut(&mut self, round_id: &str) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.id == round_id)
    }

    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn all_players_ready(&self) -> bool {
        self.players.iter().all(|p| p.ready)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    /// 1-based position of the round within its game
    pub number: u32,
    pub question: String,
    pub answers: Vec<Answer>,
    pub vote_count: u32,
}

impl Round {
    pub fn has_voted(&self, player_id: &str) -> bool {
        self.answers
            .iter()
            .any(|a| a.voters.iter().any(|v| v.id == player_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub text: String,
    pub owner: GamePlayer,
    pub voters: Vec<GamePlayer>,
    pub submitted_at: String,
}

/// One line of a game's leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub points: u32,
}
