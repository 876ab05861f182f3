use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{dto::UserRequest, repo_types::User};
use crate::{
    auth::{extractors::AuthUser, password::hash_password},
    error::ApiError,
    state::AppState,
    validation::Action,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/users/:id", put(update_user).delete(delete_user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.find_all().await.map_err(ApiError::unprocessable)?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = path?;
    let user = state.users.find_by_id(id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut user) = payload?;
    user.prepare().validate(Action::Create)?;

    let hash = hash_password(&user.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e.to_string())
    })?;

    let created = state
        .users
        .save(&user, &hash)
        .await
        .map_err(ApiError::unprocessable)?;

    info!(user_id = created.id, username = %created.username, "user created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", created.id))],
        Json(created),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(token_uid): AuthUser,
    path: Result<Path<u32>, PathRejection>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<u64>, ApiError> {
    let Path(id) = path?;
    let Json(mut user) = payload?;
    ensure_same_user(token_uid, id)?;

    user.prepare().validate(Action::Update)?;
    let rows = state.users.update(id, &user).await?;
    info!(user_id = id, rows, "user updated");
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(token_uid): AuthUser,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<u64>, ApiError> {
    let Path(id) = path?;
    ensure_same_user(token_uid, id)?;

    let rows = state.users.delete(id).await?;
    info!(user_id = id, rows, "user deleted");
    Ok(Json(rows))
}

fn ensure_same_user(token_uid: u32, id: u32) -> Result<(), ApiError> {
    if token_uid != id {
        warn!(token_uid, id, "token does not belong to target user");
        return Err(ApiError::Unauthorized(
            "token does not belong to this user".into(),
        ));
    }
    Ok(())
}
