use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{jwt::JwtKeys, services::sign_in};
use crate::{error::ApiError, state::AppState, users::dto::UserRequest, validation::Action};

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchanges `{email, password}` for a signed token.
#[instrument(skip(state, keys, payload))]
pub async fn login(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<String>, ApiError> {
    let Json(mut user) = payload?;
    user.prepare().validate(Action::Login)?;

    match sign_in(state.users.as_ref(), &keys, &user.email, &user.password).await {
        Ok(token) => {
            info!("login succeeded");
            Ok(Json(token))
        }
        Err(e) => {
            warn!(error = %e, "login failed");
            Err(ApiError::Unauthorized("Incorrect Details".into()))
        }
    }
}
