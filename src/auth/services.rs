use tracing::{debug, warn};

use super::{
    jwt::{JwtKeys, TokenError},
    password::{verify_password, PasswordError},
};
use crate::{db::RepoError, users::repo::UserRepo};

/// Why a sign-in failed. Handlers collapse every variant into one 401 so
/// callers cannot tell an unknown email from a wrong password.
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error(transparent)]
    Lookup(#[from] RepoError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Checks `password` against the stored hash for `email` and issues a token.
pub async fn sign_in(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<String, SignInError> {
    let user = users.find_by_email(email).await.map_err(|e| {
        warn!(error = %e, "sign-in lookup failed");
        e
    })?;
    verify_password(&user.password_hash, password)?;
    let token = keys.issue_token(user.id)?;
    debug!(user_id = user.id, "signed in");
    Ok(token)
}
