use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::PuzzleRequest,
    repo_types::{Puzzle, PuzzleDetails},
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState, validation::Action};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/puzzles", get(list_puzzles).post(create_puzzle))
        .route(
            "/puzzles/:id",
            get(get_puzzle).put(update_puzzle).delete(delete_puzzle),
        )
}

#[instrument(skip(state))]
pub async fn list_puzzles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Puzzle>>, ApiError> {
    let puzzles = state
        .puzzles
        .find_all(user_id)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Json(puzzles))
}

#[instrument(skip(state))]
pub async fn get_puzzle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<PuzzleDetails>, ApiError> {
    let Path(id) = path?;
    let puzzle = state.puzzles.find_by_id(id, user_id).await?;
    let boards = state.boards.find_by_puzzle(puzzle.id).await?;
    Ok(Json(PuzzleDetails { puzzle, boards }))
}

#[instrument(skip(state, payload))]
pub async fn create_puzzle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<PuzzleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut puzzle) = payload?;
    puzzle.user_id = user_id;
    puzzle.prepare().validate(Action::Create)?;

    let created = state
        .puzzles
        .save(&puzzle)
        .await
        .map_err(ApiError::unprocessable)?;

    info!(puzzle_id = created.puzzle.id, user_id, boards = created.boards.len(), "puzzle created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/puzzles/{}", created.puzzle.id))],
        Json(created),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_puzzle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<u32>, PathRejection>,
    payload: Result<Json<PuzzleRequest>, JsonRejection>,
) -> Result<Json<u64>, ApiError> {
    let Path(id) = path?;
    let Json(mut puzzle) = payload?;
    puzzle.id = id;
    puzzle.user_id = user_id;
    puzzle.prepare().validate(Action::Update)?;

    let rows = state.puzzles.update(user_id, &puzzle).await?;
    info!(puzzle_id = id, rows, "puzzle updated");
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn delete_puzzle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<u64>, ApiError> {
    let Path(id) = path?;
    let rows = state.puzzles.delete(id, user_id).await?;
    info!(puzzle_id = id, rows, "puzzle deleted");
    Ok(Json(rows))
}
