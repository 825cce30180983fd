//! Puzzle pool operations
//!
//! Lifecycle: draft -> validating -> approved/rejected -> served. The
//! generator only ever writes drafts; later transitions belong to review
//! tooling outside this crate.

use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use uuid::Uuid;
use wordgrid_common::{Error, Result};

use crate::types::Puzzle;

/// Puzzle lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleStatus {
    Draft,
    Validating,
    Approved,
    Rejected,
    Served,
}

impl PuzzleStatus {
    pub const ALL: [PuzzleStatus; 5] = [
        PuzzleStatus::Draft,
        PuzzleStatus::Validating,
        PuzzleStatus::Approved,
        PuzzleStatus::Rejected,
        PuzzleStatus::Served,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleStatus::Draft => "draft",
            PuzzleStatus::Validating => "validating",
            PuzzleStatus::Approved => "approved",
            PuzzleStatus::Rejected => "rejected",
            PuzzleStatus::Served => "served",
        }
    }
}

/// Puzzle counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub draft: i64,
    pub validating: i64,
    pub approved: i64,
    pub rejected: i64,
    pub served: i64,
    /// All rows, including unrecognized statuses
    pub total: i64,
}

impl PoolStats {
    fn slot(&mut self, status: &str) -> Option<&mut i64> {
        match status {
            "draft" => Some(&mut self.draft),
            "validating" => Some(&mut self.validating),
            "approved" => Some(&mut self.approved),
            "rejected" => Some(&mut self.rejected),
            "served" => Some(&mut self.served),
            _ => None,
        }
    }
}

/// Handle to the puzzle pool database
#[derive(Clone)]
pub struct PuzzlePool {
    pool: SqlitePool,
}

impl PuzzlePool {
    /// Wrap an initialized pool (see [`super::init_tables`])
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the pool database at `db_path`, creating it if needed
    pub async fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(super::init_database_pool(db_path).await?))
    }

    /// Insert a generated puzzle as a draft and return its id
    ///
    /// Words are stored lowercase for matching, with the generated casing
    /// preserved as display text.
    pub async fn seed_puzzle(&self, puzzle: &Puzzle) -> Result<Uuid> {
        if puzzle.groups.is_empty() {
            return Err(Error::InvalidInput("Puzzle has no groups".to_string()));
        }
        for group in &puzzle.groups {
            if group.category_name.trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "Group at sort_order {} is missing a category name",
                    group.sort_order
                )));
            }
            if group.words.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "Group '{}' has an empty word list",
                    group.category_name
                )));
            }
        }

        let metadata = serde_json::to_string(&puzzle.generation_metadata)
            .map_err(|e| Error::Internal(format!("Failed to serialize metadata: {}", e)))?;
        let puzzle_id = Uuid::new_v4();
        let model = &puzzle.generation_metadata.model;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO puzzles (id, status, generation_model, generation_metadata, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(puzzle_id.to_string())
        .bind(PuzzleStatus::Draft.as_str())
        .bind(model)
        .bind(&metadata)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for group in &puzzle.groups {
            let group_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO puzzle_groups (id, puzzle_id, category_name, difficulty_rank, sort_order)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&group_id)
            .bind(puzzle_id.to_string())
            .bind(&group.category_name)
            .bind(i64::from(group.difficulty_rank))
            .bind(group.sort_order as i64)
            .execute(&mut *tx)
            .await?;

            for word in &group.words {
                sqlx::query(
                    r#"
                    INSERT INTO puzzle_words (id, group_id, puzzle_id, word, display_text)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&group_id)
                .bind(puzzle_id.to_string())
                .bind(word.to_lowercase())
                .bind(word)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(puzzle_id = %puzzle_id, model = %model, "Seeded puzzle to pool as draft");
        Ok(puzzle_id)
    }

    /// Count puzzles by status
    pub async fn stats(&self) -> Result<PoolStats> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM puzzles GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut stats = PoolStats::default();
        for row in rows {
            let status: String = row.get("status");
            let n: i64 = row.get("n");
            stats.total += n;
            match stats.slot(&status) {
                Some(count) => *count += n,
                None => tracing::warn!(status = %status, count = n, "Unrecognized puzzle status in pool"),
            }
        }

        Ok(stats)
    }

    /// Display words of a stored puzzle, grouped in sort order
    ///
    /// An unknown id yields an empty list.
    pub async fn puzzle_words(&self, puzzle_id: Uuid) -> Result<Vec<(String, Vec<String>)>> {
        let rows = sqlx::query(
            r#"
            SELECT g.id AS group_id, g.category_name, w.display_text
            FROM puzzle_groups g
            JOIN puzzle_words w ON w.group_id = g.id
            WHERE g.puzzle_id = ?
            ORDER BY g.sort_order, w.rowid
            "#,
        )
        .bind(puzzle_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut groups: Vec<(String, String, Vec<String>)> = Vec::new();
        for row in rows {
            let group_id: String = row.get("group_id");
            let category: String = row.get("category_name");
            let word: String = row.get("display_text");
            match groups.last_mut() {
                Some(last) if last.0 == group_id => last.2.push(word),
                _ => groups.push((group_id, category, vec![word])),
            }
        }

        Ok(groups.into_iter().map(|(_, category, words)| (category, words)).collect())
    }
}
