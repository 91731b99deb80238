//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for courses, contact submissions, page copy
//! and admin credentials.

mod repository;

pub use repository::*;

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::models::{catalogue, default_pages};

/// Current time in the fixed-width RFC 3339 form stored in every timestamp column.
///
/// Fixed width keeps `ORDER BY created_at` correct as a text comparison.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    seed_pages(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            duration TEXT,
            level TEXT,
            price TEXT,
            features TEXT,
            icon_name TEXT,
            is_active INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_submissions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL,
            status TEXT DEFAULT 'new',
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS site_pages (
            slug TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin_users (
            username TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login TEXT
        );

        CREATE TABLE IF NOT EXISTS admin_sessions (
            session_id TEXT PRIMARY KEY,
            username TEXT NOT NULL REFERENCES admin_users(username),
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_courses_created_at ON courses(created_at);
        CREATE INDEX IF NOT EXISTS idx_contact_created_at ON contact_submissions(created_at);
        CREATE INDEX IF NOT EXISTS idx_contact_status ON contact_submissions(status);
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON admin_sessions(expires_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert the default copy for any page that has none yet.
async fn seed_pages(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let now = timestamp();
    for (slug, title, body) in default_pages() {
        sqlx::query(
            "INSERT OR IGNORE INTO site_pages (slug, title, body, updated_at, version) VALUES (?, ?, ?, ?, 1)",
        )
        .bind(slug)
        .bind(title)
        .bind(body)
        .bind(&now)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Seed the built-in course catalogue when the courses table is empty.
///
/// Returns the number of courses inserted.
pub async fn seed_catalogue(repo: &Repository) -> Result<usize, crate::errors::AppError> {
    if repo.count_courses().await? > 0 {
        return Ok(0);
    }

    // Insert in reverse so the first catalogue entry lists first (newest).
    let courses = catalogue();
    for course in courses.iter().rev() {
        repo.create_course(course).await?;
    }
    Ok(courses.len())
}
