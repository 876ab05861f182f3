use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Identity of the caller, read from the request token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub u32);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let user_id = keys
            .extract_token_id(&parts.uri, &parts.headers)
            .map_err(|e| {
                warn!(error = %e, "could not read user id from token");
                ApiError::from(e)
            })?;
        Ok(AuthUser(user_id))
    }
}
