use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::boards::repo_types::Board;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Puzzle {
    #[sqlx(try_from = "i64")]
    pub id: u32,
    pub name: String,
    #[sqlx(try_from = "i64")]
    pub user_id: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A puzzle together with its 81 cells, ordered by row then column.
#[derive(Debug, Clone, Serialize)]
pub struct PuzzleDetails {
    #[serde(flatten)]
    pub puzzle: Puzzle,
    pub boards: Vec<Board>,
}
