use crate::types::{AnswerId, GameId, PlayerId, RoundId};

/// Result type for game engine operations
pub type GameResult<T> = Result<T, GameError>;

/// Coarse classification of a [`GameError`], used by callers that only care
/// about how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Exhausted,
}

/// Errors returned by the game engine. None of them are fatal; they are
/// handed back to the caller untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Game {0} does not exist")]
    GameNotFound(GameId),

    #[error("Player {0} does not exist")]
    PlayerNotFound(PlayerId),

    #[error("Player {player_id} is not part of game {game_id}")]
    PlayerNotInGame { game_id: GameId, player_id: PlayerId },

    #[error("Round {0} does not exist")]
    RoundNotFound(RoundId),

    #[error("Answer {0} does not exist")]
    AnswerNotFound(AnswerId),

    #[error("No active game uses password {0:?}")]
    NoActiveGame(String),

    #[error("Game {0} has no rounds yet")]
    NoRounds(GameId),

    #[error("Password {0:?} is already used by an active game")]
    PasswordInUse(String),

    #[error("Player {player_id} already voted in round {round_id}")]
    AlreadyVoted {
        round_id: RoundId,
        player_id: PlayerId,
    },

    #[error("Question bank is exhausted")]
    QuestionsExhausted,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GameNotFound(_)
            | Self::PlayerNotFound(_)
            | Self::PlayerNotInGame { .. }
            | Self::RoundNotFound(_)
            | Self::AnswerNotFound(_)
            | Self::NoActiveGame(_)
            | Self::NoRounds(_) => ErrorKind::NotFound,
            Self::PasswordInUse(_) | Self::AlreadyVoted { .. } => ErrorKind::Conflict,
            Self::QuestionsExhausted => ErrorKind::Exhausted,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::GameNotFound(_) => "GAME_NOT_FOUND",
            Self::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            Self::PlayerNotInGame { .. } => "PLAYER_NOT_IN_GAME",
            Self::RoundNotFound(_) => "ROUND_NOT_FOUND",
            Self::AnswerNotFound(_) => "ANSWER_NOT_FOUND",
            Self::NoActiveGame(_) => "NO_ACTIVE_GAME",
            Self::NoRounds(_) => "NO_ROUNDS",
            Self::PasswordInUse(_) => "PASSWORD_IN_USE",
            Self::AlreadyVoted { .. } => "ALREADY_VOTED",
            Self::QuestionsExhausted => "QUESTIONS_EXHAUSTED",
        }
    }
}
