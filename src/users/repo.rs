use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::{dto::UserRequest, repo_types::User};
use crate::db::{id_param, RepoError};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a user whose password has already been hashed.
    async fn save(&self, user: &UserRequest, password_hash: &str) -> Result<User, RepoError>;
    async fn find_by_id(&self, id: u32) -> Result<User, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError>;
    /// At most 100 users.
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;
    /// Returns the number of rows updated; zero when `id` does not exist.
    async fn update(&self, id: u32, user: &UserRequest) -> Result<u64, RepoError>;
    /// Cascades to the user's puzzles and their boards.
    async fn delete(&self, id: u32) -> Result<u64, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn save(&self, user: &UserRequest, password_hash: &str) -> Result<User, RepoError> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, first_name, last_name, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(password_hash)
        .bind(user.created_at.unwrap_or(now))
        .bind(user.updated_at.unwrap_or(now))
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: u32) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id_param(id))
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound("User"))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound("User"))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, created_at, updated_at
            FROM users
            ORDER BY id
            LIMIT 100
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update(&self, id: u32, user: &UserRequest) -> Result<u64, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET username = $1, first_name = $2, last_name = $3, email = $4, updated_at = now()
             WHERE id = $5
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(id_param(id))
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: u32) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id_param(id))
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
