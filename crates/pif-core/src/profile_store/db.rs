//! SQLite-backed profile store implementation.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::types::UserId;

/// Percent-encode a path for a sqlite:// URI so spaces and special chars
/// don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the SQLite-backed profile store.
///
/// The database file lives under the XDG state directory:
/// `~/.local/state/pif/profiles.db`.
#[derive(Clone)]
pub struct ProfileDb {
    pool: Pool<Sqlite>,
}

impl ProfileDb {
    /// Open (or create) the default profile database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("pif")?;
        let state_dir = xdg_dirs.get_state_home();
        let db_path = state_dir.join("profiles.db");

        tokio::fs::create_dir_all(&state_dir).await?;

        let uri = path_to_sqlite_uri(&db_path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;

        let db = ProfileDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open (or create) the database at a specific path. Creates parent dirs
    /// if needed. Intended for tests so the DB can live in a temp directory.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;
        let db = ProfileDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        // The core owns exactly one profile field; everything else about a
        // user lives elsewhere.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                image_ref TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Set the profile image reference for a user (local path or sanitized
    /// URL). Upserts so first-time and repeat uploads take the same path.
    pub async fn set_image_ref(&self, user: &UserId, image_ref: &str) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, image_ref, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                image_ref = excluded.image_ref,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.as_str())
        .bind(image_ref)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Current image reference for a user, or None if never set.
    pub async fn image_ref(&self, user: &UserId) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT image_ref FROM profiles
            WHERE user_id = ?1
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("image_ref")))
    }
}

/// Current time as Unix seconds (for DB timestamps).
fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Open an in-memory database for tests (no disk I/O). Single connection:
/// each `sqlite::memory:` connection is its own database.
#[cfg(test)]
pub(crate) async fn open_memory() -> Result<ProfileDb> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = ProfileDb { pool };
    db.migrate().await?;
    Ok(db)
}
