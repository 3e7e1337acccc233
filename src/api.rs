//! HTTP API endpoints.
//!
//! A JSON mapping of the engine's operations. The answer and vote endpoints
//! hold the request open until every player has answered or voted, or until
//! the configured deadline passes, then respond either way.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::broadcast::wait_until;
use crate::error::{ErrorKind, GameError};
use crate::state::AppState;
use crate::types::*;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/players", post(create_player))
        .route("/api/players/{player_id}", get(get_player))
        .route("/api/games", post(create_game))
        .route("/api/games/join", post(join_game))
        .route("/api/games/{game_id}", get(get_game))
        .route("/api/games/{game_id}/round", get(latest_round))
        .route("/api/games/{game_id}/advance", post(force_advance))
        .route("/api/games/{game_id}/answers", post(submit_answer))
        .route(
            "/api/games/{game_id}/rounds/{round_id}/choices",
            get(list_choices),
        )
        .route("/api/games/{game_id}/choices", post(submit_choice))
        .route(
            "/api/games/{game_id}/ready",
            get(all_ready).post(player_ready),
        )
        .route("/api/games/{game_id}/score", get(score))
        .route("/api/games/{game_id}/complete", post(complete_game))
        .with_state(state)
}

/// Error body, `{ "code": .., "msg": .. }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

#[derive(Debug)]
pub struct ApiError(GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Exhausted => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorBody {
            code: self.0.code().to_string(),
            msg: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Omit to have a join code generated
    #[serde(default)]
    pub password: Option<String>,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game: Game,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGameRequest {
    pub password: String,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub player_id: PlayerId,
    pub round_id: RoundId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub answer: Answer,
    pub all_answered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoicesQuery {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitChoiceRequest {
    pub player_id: PlayerId,
    pub round_id: RoundId,
    pub answer_id: AnswerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitChoiceResponse {
    pub all_voted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerReadyRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerReadyResponse {
    /// True if this signal started the next round
    pub advanced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllReadyResponse {
    pub all_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: HashMap<PlayerId, u32>,
    pub leaderboard: Vec<ScoreEntry>,
}

/// POST /api/players
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlayerRequest>,
) -> (StatusCode, Json<Player>) {
    let player = state.create_player(&req.name);
    (StatusCode::CREATED, Json(player))
}

/// GET /api/players/{player_id}
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<Json<Player>> {
    state
        .get_player(&player_id)
        .map(Json)
        .ok_or_else(|| GameError::PlayerNotFound(player_id).into())
}

/// POST /api/games
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGameRequest>,
) -> ApiResult<(StatusCode, Json<CreateGameResponse>)> {
    let password = req.password.unwrap_or_default();
    let game = state.create_game(&password, &req.player_id)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateGameResponse {
            game,
            created: true,
        }),
    ))
}

/// POST /api/games/join
pub async fn join_game(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinGameRequest>,
) -> ApiResult<Json<Game>> {
    Ok(Json(state.join_game(&req.password, &req.player_id)?))
}

/// GET /api/games/{game_id}
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<Json<Game>> {
    Ok(Json(state.get_game(&game_id)?))
}

/// GET /api/games/{game_id}/round
pub async fn latest_round(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<Json<Round>> {
    Ok(Json(state.get_latest_round(&game_id)?))
}

/// POST /api/games/{game_id}/advance
///
/// Starts the next round without waiting for anyone.
pub async fn force_advance(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<Json<Round>> {
    tracing::info!("Forcing next round in game {}", game_id);
    Ok(Json(state.create_new_round(&game_id)?))
}

/// POST /api/games/{game_id}/answers
///
/// Responds once every player has answered or the answer deadline passes.
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    Json(req): Json<SubmitAnswerRequest>,
) -> ApiResult<Json<SubmitAnswerResponse>> {
    let mut rx = state.subscribe(&game_id)?;
    let answer = state.add_answer(&game_id, &req.player_id, &req.round_id, &req.text)?;
    tracing::info!("Answer submitted in game {}: {}", game_id, req.text);

    let timeout = Duration::from_secs(state.config.answer_timeout_secs);
    wait_until(&mut rx, timeout, || {
        // Stop waiting if the game or round went away
        state
            .all_players_answered(&game_id, &req.round_id)
            .unwrap_or(true)
    })
    .await;

    let all_answered = state.all_players_answered(&game_id, &req.round_id)?;
    if !all_answered {
        tracing::warn!(
            "Answer deadline passed in game {} round {} without every answer",
            game_id,
            req.round_id
        );
    }

    Ok(Json(SubmitAnswerResponse {
        answer,
        all_answered,
    }))
}

/// GET /api/games/{game_id}/rounds/{round_id}/choices?player_id=..
pub async fn list_choices(
    State(state): State<Arc<AppState>>,
    Path((game_id, round_id)): Path<(GameId, RoundId)>,
    Query(query): Query<ChoicesQuery>,
) -> ApiResult<Json<Vec<Answer>>> {
    Ok(Json(state.choices_for(&game_id, &round_id, &query.player_id)?))
}

/// POST /api/games/{game_id}/choices
///
/// Responds once every player has voted or the vote deadline passes.
pub async fn submit_choice(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    Json(req): Json<SubmitChoiceRequest>,
) -> ApiResult<Json<SubmitChoiceResponse>> {
    let mut rx = state.subscribe(&game_id)?;
    state.add_choice(&game_id, &req.player_id, &req.round_id, &req.answer_id)?;
    tracing::info!(
        "Vote in game {}: player {} picked {}",
        game_id,
        req.player_id,
        req.answer_id
    );

    let timeout = Duration::from_secs(state.config.vote_timeout_secs);
    wait_until(&mut rx, timeout, || {
        state
            .all_players_selected_choice(&game_id, &req.round_id)
            .unwrap_or(true)
    })
    .await;

    let all_voted = state.all_players_selected_choice(&game_id, &req.round_id)?;
    if !all_voted {
        tracing::warn!(
            "Vote deadline passed in game {} round {} without every vote",
            game_id,
            req.round_id
        );
    }

    Ok(Json(SubmitChoiceResponse { all_voted }))
}

/// POST /api/games/{game_id}/ready
pub async fn player_ready(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    Json(req): Json<PlayerReadyRequest>,
) -> ApiResult<Json<PlayerReadyResponse>> {
    let advanced = state.player_ready(&game_id, &req.player_id)?;
    Ok(Json(PlayerReadyResponse { advanced }))
}

/// GET /api/games/{game_id}/ready
pub async fn all_ready(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<Json<AllReadyResponse>> {
    let all_ready = state.all_players_ready(&game_id)?;
    Ok(Json(AllReadyResponse { all_ready }))
}

/// GET /api/games/{game_id}/score
pub async fn score(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<Json<ScoreResponse>> {
    Ok(Json(ScoreResponse {
        score: state.get_score(&game_id)?,
        leaderboard: state.leaderboard(&game_id)?,
    }))
}

/// POST /api/games/{game_id}/complete
pub async fn complete_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<Json<Game>> {
    Ok(Json(state.complete_game(&game_id)?))
}
