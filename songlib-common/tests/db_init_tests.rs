//! Tests for database initialization
//!
//! - Automatic database creation on first run
//! - Idempotent schema creation on reopen
//! - `songs` table constraints (link uniqueness, non-empty required fields)

use songlib_common::db::{init_database, SONG_COLUMNS};
use sqlx::Row;
use tempfile::TempDir;

async fn insert_song(
    pool: &sqlx::SqlitePool,
    id: &str,
    group: &str,
    title: &str,
    link: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO songs (id, group_name, title, release_date, text, link) VALUES (?, ?, ?, '2006-07-16', '', ?)")
        .bind(id)
        .bind(group)
        .bind(title)
        .bind(link)
        .execute(pool)
        .await
        .map(|_| ())
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("songlib.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("songlib.db");

    let pool1 = init_database(&db_path).await.unwrap();
    insert_song(&pool1, "a", "Muse", "Uprising", "https://example.com/a")
        .await
        .unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(&pool2.unwrap())
        .await
        .unwrap();
    assert_eq!(count, 1, "Reopening must not drop existing rows");
}

#[tokio::test]
async fn test_songs_table_columns() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("songlib.db")).await.unwrap();

    let rows = sqlx::query("PRAGMA table_info(songs)")
        .fetch_all(&pool)
        .await
        .unwrap();
    let names: Vec<String> = rows.iter().map(|r| r.get::<String, _>("name")).collect();

    assert_eq!(names, SONG_COLUMNS.to_vec());
}

#[tokio::test]
async fn test_link_is_unique() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("songlib.db")).await.unwrap();

    insert_song(&pool, "a", "Muse", "Uprising", "https://example.com/same")
        .await
        .unwrap();
    let err = insert_song(&pool, "b", "Enigma", "Sadeness", "https://example.com/same")
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("Expected a database error");
    assert!(db_err.is_unique_violation(), "Expected unique violation, got {:?}", db_err);
}

#[tokio::test]
async fn test_empty_group_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("songlib.db")).await.unwrap();

    let result = insert_song(&pool, "a", "", "Uprising", "https://example.com/a").await;
    assert!(result.is_err(), "Empty group_name must violate the CHECK constraint");
}
