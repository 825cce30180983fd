//! Local puzzle pool storage
//!
//! Generated puzzles are handed off as `draft` rows in a SQLite database.

pub mod pool;

pub use pool::{PoolStats, PuzzlePool, PuzzleStatus};

use sqlx::SqlitePool;
use std::path::Path;
use wordgrid_common::Result;

/// Open (creating if needed) the pool database and its tables
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to puzzle pool: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create pool tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS puzzles (
            id TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'draft',
            generation_model TEXT NOT NULL,
            generation_metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS puzzle_groups (
            id TEXT PRIMARY KEY,
            puzzle_id TEXT NOT NULL REFERENCES puzzles(id) ON DELETE CASCADE,
            category_name TEXT NOT NULL,
            difficulty_rank INTEGER NOT NULL,
            sort_order INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS puzzle_words (
            id TEXT PRIMARY KEY,
            group_id TEXT NOT NULL REFERENCES puzzle_groups(id) ON DELETE CASCADE,
            puzzle_id TEXT NOT NULL REFERENCES puzzles(id) ON DELETE CASCADE,
            word TEXT NOT NULL,
            display_text TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Puzzle pool tables initialized (puzzles, puzzle_groups, puzzle_words)");

    Ok(())
}
