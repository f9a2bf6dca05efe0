//! Relational store for locations, accommodations, localizations and accounts.
//!
//! Every table is created idempotently on connect, so a fresh database file and
//! an existing one go through the same path.

mod accommodations;
mod localizations;
mod locations;
mod messages;
mod users;

pub use accommodations::AccommodationFilter;
pub use localizations::ValidatedLocalization;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        is_superuser INTEGER NOT NULL DEFAULT 0,
        date_joined TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS user_groups (
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        group_id INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, group_id)
    )",
    "CREATE TABLE IF NOT EXISTS locations (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        center_lon REAL NOT NULL,
        center_lat REAL NOT NULL,
        parent_id TEXT REFERENCES locations(id) ON DELETE CASCADE,
        location_type TEXT NOT NULL,
        country_code TEXT NOT NULL,
        state_abbr TEXT NOT NULL,
        city TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_locations_parent ON locations(parent_id)",
    "CREATE TABLE IF NOT EXISTS accommodations (
        id TEXT PRIMARY KEY,
        feed INTEGER NOT NULL DEFAULT 0 CHECK (feed >= 0),
        title TEXT NOT NULL,
        country_code TEXT NOT NULL,
        bedroom_count INTEGER NOT NULL CHECK (bedroom_count >= 0),
        review_score TEXT NOT NULL DEFAULT '0.0',
        usd_rate TEXT NOT NULL,
        center_lon REAL NOT NULL,
        center_lat REAL NOT NULL,
        images TEXT NOT NULL,
        location_id TEXT NOT NULL REFERENCES locations(id) ON DELETE CASCADE,
        amenities TEXT NOT NULL,
        user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        published INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_accommodations_feed ON accommodations(feed)",
    "CREATE TABLE IF NOT EXISTS localized_accommodations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        accommodation_id TEXT NOT NULL REFERENCES accommodations(id) ON DELETE CASCADE,
        language TEXT NOT NULL,
        description TEXT NOT NULL,
        policy TEXT NOT NULL,
        UNIQUE (accommodation_id, language)
    )",
    "CREATE INDEX IF NOT EXISTS idx_localized_language ON localized_accommodations(language)",
    "CREATE TABLE IF NOT EXISTS flash_messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        level TEXT NOT NULL,
        message TEXT NOT NULL
    )",
];

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `database_url` and create tables.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context(format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context(format!("Failed to open database at {}", database_url))?;

        let db = Self { pool };
        db.bootstrap_schema().await?;

        info!("Database ready at {}", database_url);
        Ok(db)
    }

    async fn bootstrap_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply schema statement")?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}
