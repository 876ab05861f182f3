use serde::Deserialize;
use time::OffsetDateTime;

use crate::validation::{
    invalid_value, require_max_len, require_present, sanitize, Action, ValidationError,
};

const NAME_MAX: usize = 20;

/// Incoming puzzle body. Id and owner come from the path and the token,
/// never from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PuzzleRequest {
    #[serde(default)]
    pub name: String,
    #[serde(skip)]
    pub id: u32,
    #[serde(skip)]
    pub user_id: u32,
    #[serde(skip)]
    pub created_at: Option<OffsetDateTime>,
    #[serde(skip)]
    pub updated_at: Option<OffsetDateTime>,
}

impl PuzzleRequest {
    pub fn prepare(&mut self) -> &mut Self {
        self.name = sanitize(&self.name);
        let now = OffsetDateTime::now_utc();
        self.created_at = Some(now);
        self.updated_at = Some(now);
        self
    }

    /// Create and update currently require the same fields.
    pub fn validate(&self, _action: Action) -> Result<(), ValidationError> {
        require_present("Puzzle", "name", &self.name)?;
        require_max_len("Puzzle", "name", &self.name, NAME_MAX)?;
        if self.user_id < 1 {
            return Err(invalid_value("Puzzle", "user_id"));
        }
        Ok(())
    }
}
