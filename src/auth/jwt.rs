use std::time::Duration;

use axum::{
    extract::{FromRef, Query},
    http::{header, HeaderMap, Uri},
};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
/// One year.
const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Unexpected signing method: {0:?}")]
    UnexpectedSigningMethod(Algorithm),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Token not valid")]
    NotValid,
    #[error("invalid user_id claim: {0}")]
    InvalidUserId(String),
}

/// Signing and verification keys for identity tokens.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::from_secs(config.ttl_minutes.clamp(0, MAX_TTL_MINUTES) as u64 * 60),
        }
    }

    /// Signs `{authorized: true, user_id, exp: now + ttl}` with HS256.
    pub fn issue_token(&self, user_id: u32) -> Result<String, TokenError> {
        let exp = OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims::new(user_id, exp.unix_timestamp() as usize);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Verifies signature, algorithm family and expiry of a raw token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token)?;
        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::UnexpectedSigningMethod(header.alg));
        }
        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if !data.claims.authorized {
            return Err(TokenError::NotValid);
        }
        Ok(data.claims)
    }

    pub fn validate_token(&self, uri: &Uri, headers: &HeaderMap) -> Result<(), TokenError> {
        self.verify(&extract_token(uri, headers)).map(|_| ())
    }

    pub fn extract_token_id(&self, uri: &Uri, headers: &HeaderMap) -> Result<u32, TokenError> {
        let claims = self.verify(&extract_token(uri, headers))?;
        claims.user_id()
    }
}

/// Token from the `token` query parameter, else the second space-separated
/// segment of the `Authorization` header, else an empty string.
pub fn extract_token(uri: &Uri, headers: &HeaderMap) -> String {
    if let Ok(Query(params)) = Query::<Vec<(String, String)>>::try_from_uri(uri) {
        // first occurrence wins
        if let Some((_, token)) = params.into_iter().find(|(k, _)| k == "token") {
            if !token.is_empty() {
                return token;
            }
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(' ').nth(1))
        .unwrap_or_default()
        .to_string()
}
