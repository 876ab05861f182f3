use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::jwt::TokenError;

/// JWT payload carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub authorized: bool,
    pub user_id: Number, // integer when we issue it, may come back as a float
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: u32, exp: usize) -> Self {
        Self {
            authorized: true,
            user_id: Number::from(user_id),
            exp,
        }
    }

    /// Reads `user_id` as an unsigned 32-bit id. Float encodings are
    /// rounded through their fixed-point form first, so `7.0` reads as `7`.
    pub fn user_id(&self) -> Result<u32, TokenError> {
        if let Some(id) = self.user_id.as_u64() {
            return u32::try_from(id).map_err(|_| TokenError::InvalidUserId(id.to_string()));
        }
        let fixed = match self.user_id.as_f64() {
            Some(f) => format!("{f:.0}"),
            None => self.user_id.to_string(),
        };
        fixed
            .parse::<u32>()
            .map_err(|_| TokenError::InvalidUserId(fixed))
    }
}
