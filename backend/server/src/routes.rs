use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tokio::task::spawn_blocking;

use crate::{
    arena::{Arena, NewBattle},
    auth::Admin,
    error::AppError,
    project::{BattleView, EventView},
    state::AppState,
    voter::VoterId,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    #[serde(alias = "option")]
    option_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlePayload {
    new_title: String,
}

/// Runs an arena call on the blocking pool. Store I/O and the store lock stay off the async
/// workers.
async fn with_arena<T, F>(state: Arc<AppState>, operation: F) -> Result<T, AppError>
where
    F: FnOnce(&Arena) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(move || operation(&state.arena)).await?
}

pub async fn event_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EventView>, AppError> {
    let event = with_arena(state, |arena| arena.event()).await?;

    Ok(Json(event))
}

pub async fn battles_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BattleView>>, AppError> {
    let event = with_arena(state, |arena| arena.event()).await?;

    Ok(Json(event.battles))
}

pub async fn battle_handler(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<BattleView>, AppError> {
    let Path(id) = path?;
    let battle = with_arena(state, move |arena| arena.battle(id)).await?;

    Ok(Json(battle))
}

pub async fn vote_handler(
    State(state): State<Arc<AppState>>,
    VoterId(voter): VoterId,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<VotePayload>, JsonRejection>,
) -> Result<Json<BattleView>, AppError> {
    let Path(id) = path?;
    let Json(payload) = payload?;

    let battle = with_arena(state, move |arena| {
        arena.cast_vote(id, &payload.option_key, &voter)
    })
    .await?;

    Ok(Json(battle))
}

pub async fn create_battle_handler(
    State(state): State<Arc<AppState>>,
    _: Admin,
    payload: Result<Json<NewBattle>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let battle = with_arena(state, move |arena| arena.create_battle(payload)).await?;

    Ok((StatusCode::CREATED, Json(battle)))
}

pub async fn remove_battle_handler(
    State(state): State<Arc<AppState>>,
    _: Admin,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    with_arena(state, move |arena| arena.remove_battle(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn title_handler(
    State(state): State<Arc<AppState>>,
    _: Admin,
    payload: Result<Json<TitlePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let title = with_arena(state, move |arena| arena.update_title(&payload.new_title)).await?;

    Ok(Json(json!({ "title": title })))
}
