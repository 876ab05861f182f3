use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::{dto::BoardRequest, repo_types::Board};
use crate::db::{id_param, RepoError};

/// Boards carry no owner of their own. Lookups by id are unscoped and the
/// caller checks ownership through the parent puzzle.
#[async_trait]
pub trait BoardRepo: Send + Sync {
    async fn save(&self, board: &BoardRequest) -> Result<Board, RepoError>;
    async fn find_by_id(&self, id: u32) -> Result<Board, RepoError>;
    async fn find_by_puzzle_row_col(
        &self,
        puzzle_id: u32,
        row: i16,
        col: i16,
    ) -> Result<Board, RepoError>;
    /// Ordered by row, then column.
    async fn find_by_puzzle(&self, puzzle_id: u32) -> Result<Vec<Board>, RepoError>;
    /// Boards of every puzzle owned by `user_id`.
    async fn find_all(&self, user_id: u32) -> Result<Vec<Board>, RepoError>;
    /// Writes `value` to the cell addressed by puzzle, row and column.
    async fn update(&self, board: &BoardRequest) -> Result<u64, RepoError>;
    async fn delete(&self, id: u32) -> Result<u64, RepoError>;
}

#[derive(Clone)]
pub struct PgBoardRepo {
    db: PgPool,
}

impl PgBoardRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BoardRepo for PgBoardRepo {
    async fn save(&self, board: &BoardRequest) -> Result<Board, RepoError> {
        let now = OffsetDateTime::now_utc();
        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (board_row, board_col, value, puzzle_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, board_row, board_col, value, puzzle_id, created_at, updated_at
            "#,
        )
        .bind(board.board_row)
        .bind(board.board_col)
        .bind(board.value)
        .bind(id_param(board.puzzle_id))
        .bind(board.created_at.unwrap_or(now))
        .bind(board.updated_at.unwrap_or(now))
        .fetch_one(&self.db)
        .await?;
        Ok(board)
    }

    async fn find_by_id(&self, id: u32) -> Result<Board, RepoError> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, board_row, board_col, value, puzzle_id, created_at, updated_at
              FROM boards
             WHERE id = $1
            "#,
        )
        .bind(id_param(id))
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound("Board"))
    }

    async fn find_by_puzzle_row_col(
        &self,
        puzzle_id: u32,
        row: i16,
        col: i16,
    ) -> Result<Board, RepoError> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, board_row, board_col, value, puzzle_id, created_at, updated_at
              FROM boards
             WHERE puzzle_id = $1 AND board_row = $2 AND board_col = $3
            "#,
        )
        .bind(id_param(puzzle_id))
        .bind(row)
        .bind(col)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound("Board"))
    }

    async fn find_by_puzzle(&self, puzzle_id: u32) -> Result<Vec<Board>, RepoError> {
        let rows = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, board_row, board_col, value, puzzle_id, created_at, updated_at
              FROM boards
             WHERE puzzle_id = $1
             ORDER BY board_row, board_col
            "#,
        )
        .bind(id_param(puzzle_id))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_all(&self, user_id: u32) -> Result<Vec<Board>, RepoError> {
        let rows = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, board_row, board_col, value, puzzle_id, created_at, updated_at
              FROM boards
             WHERE puzzle_id IN (SELECT id FROM puzzles WHERE user_id = $1)
             ORDER BY puzzle_id, board_row, board_col
            "#,
        )
        .bind(id_param(user_id))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update(&self, board: &BoardRequest) -> Result<u64, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE boards
               SET value = $1, updated_at = now()
             WHERE puzzle_id = $2 AND board_row = $3 AND board_col = $4
            "#,
        )
        .bind(board.value)
        .bind(id_param(board.puzzle_id))
        .bind(board.board_row)
        .bind(board.board_col)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: u32) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id_param(id))
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
