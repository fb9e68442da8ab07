//! Catalog schema
//!
//! Ids are stored as hyphenated UUID text, release dates as ISO `YYYY-MM-DD`
//! text. `link` carries the catalog-wide uniqueness constraint.

use crate::Result;
use sqlx::SqlitePool;

/// Column names of the `songs` table, in declaration order
pub const SONG_COLUMNS: [&str; 6] = ["id", "group_name", "title", "release_date", "text", "link"];

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_songs_table(pool).await?;
    Ok(())
}

async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id TEXT PRIMARY KEY,
            group_name TEXT NOT NULL CHECK (length(group_name) > 0),
            title TEXT NOT NULL CHECK (length(title) > 0),
            release_date TEXT,
            text TEXT NOT NULL DEFAULT '',
            link TEXT NOT NULL UNIQUE CHECK (length(link) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_group_title ON songs(group_name, title)")
        .execute(pool)
        .await?;

    Ok(())
}
