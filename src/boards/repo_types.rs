use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One cell of a puzzle's 9x9 grid. `value` 0 marks an empty cell.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Board {
    #[sqlx(try_from = "i64")]
    pub id: u32,
    pub board_row: i16,
    pub board_col: i16,
    pub value: i16,
    #[sqlx(try_from = "i64")]
    pub puzzle_id: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
