//! In-memory repositories for tests. Mirrors the Postgres schema: unique
//! columns, foreign keys and cascading deletes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::password::hash_password,
    boards::{dto::BoardRequest, repo::BoardRepo, repo_types::Board},
    db::RepoError,
    puzzles::{
        dto::PuzzleRequest,
        repo::PuzzleRepo,
        repo_types::{Puzzle, PuzzleDetails},
    },
    state::AppState,
    users::{dto::UserRequest, repo::UserRepo, repo_types::User},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    puzzles: Vec<Puzzle>,
    boards: Vec<Board>,
    last_id: u32,
}

impl Tables {
    fn next_id(&mut self) -> u32 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_board(&mut self, board: Board) -> Result<Board, RepoError> {
        if self.boards.iter().any(|b| {
            b.puzzle_id == board.puzzle_id
                && b.board_row == board.board_row
                && b.board_col == board.board_col
        }) {
            return Err(RepoError::Duplicate("boards_puzzle_id_board_row_board_col_key".into()));
        }
        self.boards.push(board.clone());
        Ok(board)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

fn foreign_key(name: &str) -> RepoError {
    RepoError::Query(sqlx::Error::Protocol(format!("foreign key violation: {name}")))
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn save(&self, user: &UserRequest, password_hash: &str) -> Result<User, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Duplicate("users_username_key".into()));
        }
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate("users_email_key".into()));
        }
        let now = OffsetDateTime::now_utc();
        let saved = User {
            id: t.next_id(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password_hash: password_hash.to_string(),
            created_at: user.created_at.unwrap_or(now),
            updated_at: user.updated_at.unwrap_or(now),
        };
        t.users.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: u32) -> Result<User, RepoError> {
        let t = self.tables.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepoError::NotFound("User"))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        let t = self.tables.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound("User"))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().take(100).cloned().collect())
    }

    async fn update(&self, id: u32, user: &UserRequest) -> Result<u64, RepoError> {
        let mut t = self.tables.lock().unwrap();
        let others = || t.users.iter().filter(|u| u.id != id);
        if others().any(|u| u.username == user.username) {
            return Err(RepoError::Duplicate("users_username_key".into()));
        }
        if others().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate("users_email_key".into()));
        }
        let Some(row) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(0);
        };
        row.username = user.username.clone();
        row.first_name = user.first_name.clone();
        row.last_name = user.last_name.clone();
        row.email = user.email.clone();
        row.updated_at = OffsetDateTime::now_utc();
        Ok(1)
    }

    async fn delete(&self, id: u32) -> Result<u64, RepoError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        let deleted = (before - t.users.len()) as u64;
        let owned: Vec<u32> = t
            .puzzles
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        t.puzzles.retain(|p| p.user_id != id);
        t.boards.retain(|b| !owned.contains(&b.puzzle_id));
        Ok(deleted)
    }
}

#[async_trait]
impl PuzzleRepo for MemoryStore {
    async fn save(&self, puzzle: &PuzzleRequest) -> Result<PuzzleDetails, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if !t.users.iter().any(|u| u.id == puzzle.user_id) {
            return Err(foreign_key("puzzles_user_id_fkey"));
        }
        if t.puzzles.iter().any(|p| p.name == puzzle.name) {
            return Err(RepoError::Duplicate("puzzles_name_key".into()));
        }
        let now = OffsetDateTime::now_utc();
        let created_at = puzzle.created_at.unwrap_or(now);
        let updated_at = puzzle.updated_at.unwrap_or(now);
        let saved = Puzzle {
            id: t.next_id(),
            name: puzzle.name.clone(),
            user_id: puzzle.user_id,
            created_at,
            updated_at,
        };
        t.puzzles.push(saved.clone());

        let mut boards = Vec::with_capacity(81);
        for row in 1..=9 {
            for col in 1..=9 {
                let board = Board {
                    id: t.next_id(),
                    board_row: row,
                    board_col: col,
                    value: 0,
                    puzzle_id: saved.id,
                    created_at,
                    updated_at,
                };
                boards.push(t.insert_board(board)?);
            }
        }
        Ok(PuzzleDetails {
            puzzle: saved,
            boards,
        })
    }

    async fn find_by_id(&self, id: u32, user_id: u32) -> Result<Puzzle, RepoError> {
        let t = self.tables.lock().unwrap();
        t.puzzles
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned()
            .ok_or(RepoError::NotFound("Puzzle"))
    }

    async fn find_all(&self, user_id: u32) -> Result<Vec<Puzzle>, RepoError> {
        let t = self.tables.lock().unwrap();
        Ok(t.puzzles
            .iter()
            .filter(|p| p.user_id == user_id)
            .take(100)
            .cloned()
            .collect())
    }

    async fn update(&self, user_id: u32, puzzle: &PuzzleRequest) -> Result<u64, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if t
            .puzzles
            .iter()
            .any(|p| p.id != puzzle.id && p.name == puzzle.name)
        {
            return Err(RepoError::Duplicate("puzzles_name_key".into()));
        }
        let Some(row) = t
            .puzzles
            .iter_mut()
            .find(|p| p.id == puzzle.id && p.user_id == user_id)
        else {
            return Ok(0);
        };
        row.name = puzzle.name.clone();
        row.updated_at = OffsetDateTime::now_utc();
        Ok(1)
    }

    async fn delete(&self, id: u32, user_id: u32) -> Result<u64, RepoError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.puzzles.len();
        t.puzzles.retain(|p| !(p.id == id && p.user_id == user_id));
        let deleted = (before - t.puzzles.len()) as u64;
        if deleted > 0 {
            t.boards.retain(|b| b.puzzle_id != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl BoardRepo for MemoryStore {
    async fn save(&self, board: &BoardRequest) -> Result<Board, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if !t.puzzles.iter().any(|p| p.id == board.puzzle_id) {
            return Err(foreign_key("boards_puzzle_id_fkey"));
        }
        let now = OffsetDateTime::now_utc();
        let row = Board {
            id: t.next_id(),
            board_row: board.board_row,
            board_col: board.board_col,
            value: board.value,
            puzzle_id: board.puzzle_id,
            created_at: board.created_at.unwrap_or(now),
            updated_at: board.updated_at.unwrap_or(now),
        };
        t.insert_board(row)
    }

    async fn find_by_id(&self, id: u32) -> Result<Board, RepoError> {
        let t = self.tables.lock().unwrap();
        t.boards
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(RepoError::NotFound("Board"))
    }

    async fn find_by_puzzle_row_col(
        &self,
        puzzle_id: u32,
        row: i16,
        col: i16,
    ) -> Result<Board, RepoError> {
        let t = self.tables.lock().unwrap();
        t.boards
            .iter()
            .find(|b| b.puzzle_id == puzzle_id && b.board_row == row && b.board_col == col)
            .cloned()
            .ok_or(RepoError::NotFound("Board"))
    }

    async fn find_by_puzzle(&self, puzzle_id: u32) -> Result<Vec<Board>, RepoError> {
        let t = self.tables.lock().unwrap();
        let mut boards: Vec<Board> = t
            .boards
            .iter()
            .filter(|b| b.puzzle_id == puzzle_id)
            .cloned()
            .collect();
        boards.sort_by_key(|b| (b.board_row, b.board_col));
        Ok(boards)
    }

    async fn find_all(&self, user_id: u32) -> Result<Vec<Board>, RepoError> {
        let t = self.tables.lock().unwrap();
        let owned: Vec<u32> = t
            .puzzles
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();
        Ok(t.boards
            .iter()
            .filter(|b| owned.contains(&b.puzzle_id))
            .cloned()
            .collect())
    }

    async fn update(&self, board: &BoardRequest) -> Result<u64, RepoError> {
        let mut t = self.tables.lock().unwrap();
        let mut rows = 0;
        for b in t.boards.iter_mut().filter(|b| {
            b.puzzle_id == board.puzzle_id
                && b.board_row == board.board_row
                && b.board_col == board.board_col
        }) {
            b.value = board.value;
            b.updated_at = OffsetDateTime::now_utc();
            rows += 1;
        }
        Ok(rows)
    }

    async fn delete(&self, id: u32) -> Result<u64, RepoError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.boards.len();
        t.boards.retain(|b| b.id != id);
        Ok((before - t.boards.len()) as u64)
    }
}

/// Saves `<name>@gmail.com` with password `password`.
pub async fn seed_user(state: &AppState, name: &str) -> User {
    let user = UserRequest {
        username: name.into(),
        email: format!("{name}@gmail.com"),
        first_name: name.into(),
        last_name: "Tester".into(),
        ..Default::default()
    };
    let hash = hash_password("password").unwrap();
    state.users.save(&user, &hash).await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_user(name: &str) -> (MemoryStore, u32) {
        let store = MemoryStore::default();
        let user = UserRequest {
            username: name.into(),
            email: format!("{name}@gmail.com"),
            first_name: name.into(),
            last_name: "Tester".into(),
            ..Default::default()
        };
        let id = UserRepo::save(&store, &user, "hash").await.unwrap().id;
        (store, id)
    }

    fn puzzle(name: &str, user_id: u32) -> PuzzleRequest {
        PuzzleRequest {
            name: name.into(),
            user_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn new_puzzle_has_every_cell_empty() {
        let (store, uid) = store_with_user("alice").await;
        let details = PuzzleRepo::save(&store, &puzzle("Alpha", uid)).await.unwrap();
        assert_eq!(details.boards.len(), 81);
        for row in 1..=9 {
            for col in 1..=9 {
                let matches: Vec<_> = details
                    .boards
                    .iter()
                    .filter(|b| b.board_row == row && b.board_col == col)
                    .collect();
                assert_eq!(matches.len(), 1);
                assert_eq!(matches[0].value, 0);
                assert_eq!(matches[0].puzzle_id, details.puzzle.id);
            }
        }
    }

    #[tokio::test]
    async fn foreign_puzzle_is_indistinguishable_from_missing() {
        let (store, alice) = store_with_user("alice").await;
        let bob = UserRepo::save(
            &store,
            &UserRequest {
                username: "bob".into(),
                email: "bob@gmail.com".into(),
                ..Default::default()
            },
            "hash",
        )
        .await
        .unwrap()
        .id;
        let pid = PuzzleRepo::save(&store, &puzzle("Alpha", alice)).await.unwrap().puzzle.id;

        let missing = PuzzleRepo::find_by_id(&store, pid + 1000, bob).await.unwrap_err();
        let foreign = PuzzleRepo::find_by_id(&store, pid, bob).await.unwrap_err();
        assert_eq!(missing.to_string(), foreign.to_string());
        assert!(matches!(foreign, RepoError::NotFound("Puzzle")));
    }

    #[tokio::test]
    async fn alpha_scenario() {
        let store = MemoryStore::default();
        store.tables.lock().unwrap().last_id = 6;
        let uid = UserRepo::save(
            &store,
            &UserRequest {
                username: "seven".into(),
                email: "seven@gmail.com".into(),
                ..Default::default()
            },
            "hash",
        )
        .await
        .unwrap()
        .id;
        assert_eq!(uid, 7);

        let details = PuzzleRepo::save(&store, &puzzle("Alpha", 7)).await.unwrap();
        assert_eq!(details.puzzle.user_id, 7);
        assert!(details.boards.iter().all(|b| b.puzzle_id == details.puzzle.id));

        let rows = BoardRepo::update(
            &store,
            &BoardRequest {
                board_row: 5,
                board_col: 4,
                value: 6,
                puzzle_id: details.puzzle.id,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(rows, 1);

        assert_eq!(PuzzleRepo::delete(&store, details.puzzle.id, 7).await.unwrap(), 1);
        for board in &details.boards {
            let err = BoardRepo::find_by_id(&store, board.id).await.unwrap_err();
            assert!(matches!(err, RepoError::NotFound("Board")));
        }
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let (store, uid) = store_with_user("alice").await;
        let details = PuzzleRepo::save(&store, &puzzle("Alpha", uid)).await.unwrap();
        assert_eq!(UserRepo::delete(&store, uid).await.unwrap(), 1);
        assert!(PuzzleRepo::find_all(&store, uid).await.unwrap().is_empty());
        assert!(BoardRepo::find_by_puzzle(&store, details.puzzle.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn zero_rows_is_not_an_error() {
        let (store, uid) = store_with_user("alice").await;
        assert_eq!(UserRepo::delete(&store, uid + 1).await.unwrap(), 0);
        assert_eq!(PuzzleRepo::delete(&store, 42, uid).await.unwrap(), 0);
        assert_eq!(
            PuzzleRepo::update(&store, uid, &PuzzleRequest { id: 42, ..puzzle("Beta", uid) })
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unique_columns_are_enforced() {
        let (store, uid) = store_with_user("alice").await;
        let dup = UserRequest {
            username: "alice".into(),
            email: "other@gmail.com".into(),
            ..Default::default()
        };
        assert!(matches!(
            UserRepo::save(&store, &dup, "hash").await.unwrap_err(),
            RepoError::Duplicate(_)
        ));
        let other = UserRequest {
            username: "carol".into(),
            email: "carol@gmail.com".into(),
            ..Default::default()
        };
        UserRepo::save(&store, &other, "hash").await.unwrap();
        let taken_email = UserRequest {
            username: "alice".into(),
            email: "carol@gmail.com".into(),
            ..Default::default()
        };
        match UserRepo::update(&store, uid, &taken_email).await.unwrap_err() {
            RepoError::Duplicate(key) => assert_eq!(key, "users_email_key"),
            other => panic!("unexpected error: {other:?}"),
        }

        PuzzleRepo::save(&store, &puzzle("Alpha", uid)).await.unwrap();
        assert!(matches!(
            PuzzleRepo::save(&store, &puzzle("Alpha", uid)).await.unwrap_err(),
            RepoError::Duplicate(_)
        ));
    }
}
