//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::calendar::format_date;
use crate::error::{GameError, ServiceError};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;
use crate::store::PlayerRecord;

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    let status = match &self {
      ServiceError::Game(GameError::PoolEmpty) => StatusCode::SERVICE_UNAVAILABLE,
      ServiceError::Game(GameError::GameAlreadyOver) => StatusCode::CONFLICT,
      ServiceError::Game(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ServiceError::InvalidPlayer(_) | ServiceError::InvalidDate(_) | ServiceError::NoSession => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorOut { code: self.code().to_string(), message: self.message() })).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, idioms: state.pool.len(), today: format_date(state.today()) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_player(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(register_player(&state).await)
}

#[instrument(level = "info", skip(state), fields(player = ?q.player, date = ?q.date))]
pub async fn http_get_puzzle(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PuzzleQuery>,
) -> Result<Json<PuzzleView>, ServiceError> {
  let view = puzzle_view(&state, q.player.as_deref(), q.date.as_deref(), q.mode).await?;
  info!(target: "puzzle", date = %view.puzzle.date, day_index = view.puzzle.day_index, "HTTP puzzle served");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(player = %body.player, guess = %body.guess))]
pub async fn http_post_guess(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GuessIn>,
) -> Result<Json<GuessResultOut>, ServiceError> {
  let out = submit_guess(&state, &body.player, &body.guess).await?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(player = %q.player))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PlayerQuery>,
) -> Result<Json<HintOut>, ServiceError> {
  Ok(Json(hint_for_player(&state, &q.player).await?))
}

#[instrument(level = "info", skip(state), fields(player = %q.player))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PlayerQuery>,
) -> Result<Json<StatsOut>, ServiceError> {
  Ok(Json(stats_for_player(&state, &q.player).await?))
}

#[instrument(level = "info", skip(state, body), fields(player = %body.player))]
pub async fn http_put_settings(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SettingsIn>,
) -> Result<Json<PlayerOut>, ServiceError> {
  Ok(Json(update_settings(&state, &body.player, body.settings).await?))
}

#[instrument(level = "info", skip(state, body), fields(player = %body.player, updated = body.record.updated))]
pub async fn http_post_sync(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SyncIn>,
) -> Result<Json<PlayerRecord>, ServiceError> {
  Ok(Json(sync_record(&state, &body.player, body.record).await?))
}
