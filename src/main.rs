use std::sync::Arc;

use anyhow::Context;

mod app;
mod auth;
mod boards;
mod config;
mod db;
mod error;
mod middleware;
mod puzzles;
mod state;
#[cfg(test)]
mod testing;
mod users;
mod validation;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "sudoku_backend=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    let db = db::connect(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    let state = AppState::from_pool(db, config.clone());
    let app = app::build_app(state);
    app::serve(app, &config.host, config.port).await
}
