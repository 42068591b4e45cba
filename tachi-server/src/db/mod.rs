//! SQLite persistence for users, score summaries, goals and quests

pub mod store;
pub mod writes;

pub use store::SqliteDatastore;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tachi_common::Result;

/// Open (creating if needed) the database file and ensure the schema
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Private in-memory database with the schema applied
///
/// Limited to one connection, since every SQLite `:memory:` connection is
/// its own database.
pub async fn memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Create tables that don't exist yet
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per game/playtype a user has played
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS game_stats (
            user_id INTEGER NOT NULL REFERENCES users(id),
            game TEXT NOT NULL,
            playtype TEXT NOT NULL,
            PRIMARY KEY (user_id, game, playtype)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS personal_bests (
            user_id INTEGER NOT NULL REFERENCES users(id),
            chart_id TEXT NOT NULL,
            score REAL NOT NULL,
            percent REAL NOT NULL,
            lamp_index INTEGER NOT NULL,
            grade_index INTEGER NOT NULL,
            PRIMARY KEY (user_id, chart_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS folder_charts (
            folder_id TEXT NOT NULL,
            chart_id TEXT NOT NULL,
            PRIMARY KEY (folder_id, chart_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // criteria and charts are JSON
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS goals (
            goal_id TEXT PRIMARY KEY,
            game TEXT NOT NULL,
            playtype TEXT NOT NULL,
            name TEXT NOT NULL,
            criteria TEXT NOT NULL,
            charts TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS goal_subs (
            user_id INTEGER NOT NULL REFERENCES users(id),
            goal_id TEXT NOT NULL REFERENCES goals(goal_id),
            game TEXT NOT NULL,
            playtype TEXT NOT NULL,
            achieved INTEGER NOT NULL,
            out_of REAL NOT NULL,
            out_of_human TEXT NOT NULL,
            progress REAL,
            progress_human TEXT NOT NULL,
            last_interaction TEXT,
            PRIMARY KEY (user_id, goal_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quests (
            quest_id TEXT PRIMARY KEY,
            game TEXT NOT NULL,
            playtype TEXT NOT NULL,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quest_goals (
            quest_id TEXT NOT NULL REFERENCES quests(quest_id),
            goal_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (quest_id, goal_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_quest_goals_goal ON quest_goals(goal_id)")
        .execute(pool)
        .await?;

    Ok(())
}
