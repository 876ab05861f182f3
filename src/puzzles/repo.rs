use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::{
    dto::PuzzleRequest,
    repo_types::{Puzzle, PuzzleDetails},
};
use crate::{
    boards::repo_types::Board,
    db::{id_param, RepoError},
};

/// Every read and write is scoped to the owning user. A puzzle owned by
/// someone else is reported as not found.
#[async_trait]
pub trait PuzzleRepo: Send + Sync {
    /// Inserts the puzzle and its 81 empty cells atomically.
    async fn save(&self, puzzle: &PuzzleRequest) -> Result<PuzzleDetails, RepoError>;
    async fn find_by_id(&self, id: u32, user_id: u32) -> Result<Puzzle, RepoError>;
    /// At most 100 puzzles.
    async fn find_all(&self, user_id: u32) -> Result<Vec<Puzzle>, RepoError>;
    /// Renames `puzzle.id`; returns zero when it is not owned by `user_id`.
    async fn update(&self, user_id: u32, puzzle: &PuzzleRequest) -> Result<u64, RepoError>;
    /// Cascades to the puzzle's boards.
    async fn delete(&self, id: u32, user_id: u32) -> Result<u64, RepoError>;
}

#[derive(Clone)]
pub struct PgPuzzleRepo {
    db: PgPool,
}

impl PgPuzzleRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PuzzleRepo for PgPuzzleRepo {
    async fn save(&self, puzzle: &PuzzleRequest) -> Result<PuzzleDetails, RepoError> {
        let now = OffsetDateTime::now_utc();
        let created_at = puzzle.created_at.unwrap_or(now);
        let updated_at = puzzle.updated_at.unwrap_or(now);

        let mut tx = self.db.begin().await?;

        let saved = sqlx::query_as::<_, Puzzle>(
            r#"
            INSERT INTO puzzles (name, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, user_id, created_at, updated_at
            "#,
        )
        .bind(&puzzle.name)
        .bind(id_param(puzzle.user_id))
        .bind(created_at)
        .bind(updated_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut boards = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (board_row, board_col, value, puzzle_id, created_at, updated_at)
            SELECT r::SMALLINT, c::SMALLINT, 0, $1, $2, $3
              FROM generate_series(1, 9) AS r
             CROSS JOIN generate_series(1, 9) AS c
            RETURNING id, board_row, board_col, value, puzzle_id, created_at, updated_at
            "#,
        )
        .bind(id_param(saved.id))
        .bind(created_at)
        .bind(updated_at)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        boards.sort_by_key(|b| (b.board_row, b.board_col));
        Ok(PuzzleDetails {
            puzzle: saved,
            boards,
        })
    }

    async fn find_by_id(&self, id: u32, user_id: u32) -> Result<Puzzle, RepoError> {
        sqlx::query_as::<_, Puzzle>(
            r#"
            SELECT id, name, user_id, created_at, updated_at
              FROM puzzles
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id_param(id))
        .bind(id_param(user_id))
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound("Puzzle"))
    }

    async fn find_all(&self, user_id: u32) -> Result<Vec<Puzzle>, RepoError> {
        let rows = sqlx::query_as::<_, Puzzle>(
            r#"
            SELECT id, name, user_id, created_at, updated_at
              FROM puzzles
             WHERE user_id = $1
             ORDER BY id
             LIMIT 100
            "#,
        )
        .bind(id_param(user_id))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update(&self, user_id: u32, puzzle: &PuzzleRequest) -> Result<u64, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE puzzles
               SET name = $1, updated_at = now()
             WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(&puzzle.name)
        .bind(id_param(puzzle.id))
        .bind(id_param(user_id))
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: u32, user_id: u32) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM puzzles WHERE id = $1 AND user_id = $2")
            .bind(id_param(id))
            .bind(id_param(user_id))
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
