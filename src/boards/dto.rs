use std::ops::RangeInclusive;

use serde::Deserialize;
use time::OffsetDateTime;

use crate::validation::{invalid_value, Action, ValidationError};

pub const CELL_RANGE: RangeInclusive<i16> = 1..=9;
const VALUE_RANGE: RangeInclusive<i16> = 0..=9;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardRequest {
    #[serde(default)]
    pub board_row: i16,
    #[serde(default)]
    pub board_col: i16,
    #[serde(default)]
    pub value: i16,
    #[serde(default)]
    pub puzzle_id: u32,
    #[serde(skip)]
    pub created_at: Option<OffsetDateTime>,
    #[serde(skip)]
    pub updated_at: Option<OffsetDateTime>,
}

impl BoardRequest {
    pub fn prepare(&mut self) -> &mut Self {
        let now = OffsetDateTime::now_utc();
        self.created_at = Some(now);
        self.updated_at = Some(now);
        self
    }

    /// Create accepts an empty cell (0); update must write a digit.
    pub fn validate(&self, action: Action) -> Result<(), ValidationError> {
        if !CELL_RANGE.contains(&self.board_row) {
            return Err(invalid_value("Board", "board_row"));
        }
        if !CELL_RANGE.contains(&self.board_col) {
            return Err(invalid_value("Board", "board_col"));
        }
        if self.puzzle_id < 1 {
            return Err(invalid_value("Board", "puzzle_id"));
        }
        let allowed = match action {
            Action::Update => CELL_RANGE,
            Action::Create | Action::Login => VALUE_RANGE,
        };
        if !allowed.contains(&self.value) {
            return Err(invalid_value("Board", "value"));
        }
        Ok(())
    }
}
