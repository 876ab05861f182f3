use std::str::FromStr;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{BoardRequest, CELL_RANGE},
    repo_types::Board,
};
use crate::{
    auth::extractors::AuthUser, db::RepoError, error::ApiError, state::AppState,
    validation::Action,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/boards",
            get(list_boards).post(create_board).put(update_board),
        )
        .route("/boards/:id", get(get_board).delete(delete_board))
        .route("/puzzles/:id/boards/:row/:col", get(get_board_at))
}

#[instrument(skip(state))]
pub async fn list_boards(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Board>>, ApiError> {
    let boards = state
        .boards
        .find_all(user_id)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Json(boards))
}

#[instrument(skip(state))]
pub async fn get_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<Board>, ApiError> {
    let Path(id) = path?;
    let board = state.boards.find_by_id(id).await?;
    ensure_owner(&state, board.puzzle_id, user_id).await?;
    Ok(Json(board))
}

#[instrument(skip(state))]
pub async fn get_board_at(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<(u32, i16, i16)>, PathRejection>,
) -> Result<Json<Board>, ApiError> {
    let Path((puzzle_id, row, col)) = path?;
    ensure_owner(&state, puzzle_id, user_id).await?;
    let board = state
        .boards
        .find_by_puzzle_row_col(puzzle_id, row, col)
        .await?;
    Ok(Json(board))
}

#[instrument(skip(state, payload))]
pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<BoardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut board) = payload?;
    board.prepare().validate(Action::Create)?;
    ensure_owner(&state, board.puzzle_id, user_id).await?;

    let created = state
        .boards
        .save(&board)
        .await
        .map_err(ApiError::unprocessable)?;

    info!(board_id = created.id, puzzle_id = created.puzzle_id, "board created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/boards/{}", created.id))],
        Json(created),
    ))
}

/// `PUT /boards?puzzle_id=..&board_row=..&board_col=..` with `{"value": n}`.
#[instrument(skip(state, payload))]
pub async fn update_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    uri: Uri,
    payload: Result<Json<BoardRequest>, JsonRejection>,
) -> Result<Json<u64>, ApiError> {
    let cell = cell_query(&uri)?;
    let Json(mut board) = payload?;
    board.puzzle_id = cell.puzzle_id;
    board.board_row = cell.board_row;
    board.board_col = cell.board_col;
    board.prepare().validate(Action::Update)?;
    ensure_owner(&state, board.puzzle_id, user_id).await?;

    let rows = state.boards.update(&board).await?;
    info!(
        puzzle_id = board.puzzle_id,
        row = board.board_row,
        col = board.board_col,
        rows,
        "board updated"
    );
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn delete_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<u64>, ApiError> {
    let Path(id) = path?;
    let board = state.boards.find_by_id(id).await?;
    ensure_owner(&state, board.puzzle_id, user_id).await?;

    let rows = state.boards.delete(id).await?;
    info!(board_id = id, rows, "board deleted");
    Ok(Json(rows))
}

/// Boards belong to whoever owns their puzzle.
async fn ensure_owner(state: &AppState, puzzle_id: u32, user_id: u32) -> Result<(), ApiError> {
    match state.puzzles.find_by_id(puzzle_id, user_id).await {
        Ok(_) => Ok(()),
        Err(RepoError::NotFound(_)) => {
            warn!(puzzle_id, user_id, "board accessed through a puzzle the caller does not own");
            Err(ApiError::Unauthorized(
                "puzzle does not belong to this user".into(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, PartialEq, Eq)]
struct CellQuery {
    puzzle_id: u32,
    board_row: i16,
    board_col: i16,
}

fn cell_query(uri: &Uri) -> Result<CellQuery, ApiError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let puzzle_id: u32 = single(&pairs, "puzzle_id")?;
    if puzzle_id < 1 {
        return Err(out_of_range("puzzle_id"));
    }
    let board_row: i16 = single(&pairs, "board_row")?;
    if !CELL_RANGE.contains(&board_row) {
        return Err(out_of_range("board_row"));
    }
    let board_col: i16 = single(&pairs, "board_col")?;
    if !CELL_RANGE.contains(&board_col) {
        return Err(out_of_range("board_col"));
    }
    Ok(CellQuery {
        puzzle_id,
        board_row,
        board_col,
    })
}

fn single<T: FromStr>(pairs: &[(String, String)], key: &str) -> Result<T, ApiError> {
    let mut values = pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v);
    match (values.next(), values.next()) {
        (Some(v), None) => v
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid query parameter '{key}'"))),
        (None, _) => Err(ApiError::BadRequest(format!(
            "missing query parameter '{key}'"
        ))),
        (Some(_), Some(_)) => Err(ApiError::BadRequest(format!(
            "duplicate query parameter '{key}'"
        ))),
    }
}

fn out_of_range(key: &str) -> ApiError {
    ApiError::BadRequest(format!("query parameter '{key}' out of range"))
}
