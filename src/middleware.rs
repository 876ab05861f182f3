use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{auth::jwt::JwtKeys, error::ApiError, state::AppState};

/// Every response is JSON unless a handler said otherwise.
pub async fn set_json_content_type(mut res: Response) -> Response {
    res.headers_mut()
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    res
}

/// Rejects the request with 401 before it reaches a handler unless it
/// carries a valid token.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let keys = JwtKeys::new(&state.config.jwt);
    if let Err(e) = keys.validate_token(req.uri(), req.headers()) {
        warn!(error = %e, uri = %req.uri().path(), "rejected unauthenticated request");
        return Err(e.into());
    }
    Ok(next.run(req).await)
}
