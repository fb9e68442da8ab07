//! SQLite catalog store
//!
//! Each public operation acquires one pooled connection, pings it, opens a
//! transaction on it and hands the transaction's connection to a private
//! `*_in` function. [`finish`] commits on success and rolls back on error;
//! a transaction dropped on any other path (e.g. a cancelled future) is
//! rolled back by sqlx.
//!
//! Mutating units open with `BEGIN IMMEDIATE`: the write lock is taken
//! before the first read, so concurrent writers queue on the busy timeout
//! instead of failing a read-to-write lock upgrade with `SQLITE_BUSY`.

use async_trait::async_trait;
use chrono::NaiveDate;
use songlib_common::db::SONG_COLUMNS;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::{Connection, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;

use super::{CatalogStore, StoreError, StoreResult};
use crate::filter::{FilterValue, Predicate};
use crate::models::{Song, SongPatch};

const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

fn select_song() -> String {
    format!("SELECT {} FROM songs", SONG_COLUMNS.join(", "))
}

/// Catalog store backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Acquire a connection and verify it answers before any work starts
    async fn checked_connection(&self) -> StoreResult<PoolConnection<Sqlite>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        conn.ping()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(conn)
    }
}

/// Close a unit of work: commit on success, roll back on failure
async fn finish<T>(tx: Transaction<'_, Sqlite>, result: StoreResult<T>) -> StoreResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

fn song_from_row(row: &SqliteRow) -> StoreResult<Song> {
    let id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt(format!("id '{}': {}", id, e)))?;

    Ok(Song {
        id,
        group: row.try_get("group_name")?,
        title: row.try_get("title")?,
        release_date: row.try_get::<Option<NaiveDate>, _>("release_date")?,
        text: row.try_get("text")?,
        link: row.try_get("link")?,
    })
}

async fn fetch_song_in(conn: &mut SqliteConnection, id: Uuid) -> StoreResult<Option<Song>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", select_song()))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(song_from_row).transpose()
}

async fn insert_in(conn: &mut SqliteConnection, song: &Song) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (id, group_name, title, release_date, text, link)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(song.id.to_string())
    .bind(&song.group)
    .bind(&song.title)
    .bind(song.release_date)
    .bind(&song.text)
    .bind(&song.link)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn update_in(conn: &mut SqliteConnection, id: Uuid, patch: SongPatch) -> StoreResult<Song> {
    let existing = fetch_song_in(conn, id)
        .await?
        .ok_or(StoreError::NotFound(id))?;

    if patch.is_empty() {
        return Ok(existing);
    }

    let merged = patch.apply(existing);

    sqlx::query(
        r#"
        UPDATE songs
        SET group_name = ?, title = ?, release_date = ?, text = ?, link = ?
        WHERE id = ?
        "#,
    )
    .bind(&merged.group)
    .bind(&merged.title)
    .bind(merged.release_date)
    .bind(&merged.text)
    .bind(&merged.link)
    .bind(id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(merged)
}

async fn delete_in(conn: &mut SqliteConnection, id: Uuid) -> StoreResult<()> {
    if fetch_song_in(conn, id).await?.is_none() {
        return Err(StoreError::NotFound(id));
    }

    sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn list_in(
    conn: &mut SqliteConnection,
    predicates: &[Predicate],
    limit: u32,
    offset: u32,
) -> StoreResult<Vec<Song>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(select_song());

    for (idx, predicate) in predicates.iter().enumerate() {
        query.push(if idx == 0 { " WHERE " } else { " AND " });
        query.push(predicate.field.column());
        query.push(" = ");
        match &predicate.value {
            FilterValue::Id(id) => query.push_bind(id.to_string()),
            FilterValue::Text(value) => query.push_bind(value.clone()),
            FilterValue::Date(date) => query.push_bind(*date),
        };
    }

    query.push(" LIMIT ");
    query.push_bind(i64::from(limit));
    query.push(" OFFSET ");
    query.push_bind(i64::from(offset));

    let rows = query.build().fetch_all(&mut *conn).await?;

    rows.iter().map(song_from_row).collect()
}

async fn text_in(conn: &mut SqliteConnection, id: Uuid) -> StoreResult<String> {
    sqlx::query_scalar::<_, String>("SELECT text FROM songs WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::NotFound(id))
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn insert(&self, song: &Song) -> StoreResult<()> {
        let mut conn = self.checked_connection().await?;
        let mut tx = conn.begin_with(BEGIN_WRITE).await?;
        let result = insert_in(&mut tx, song).await;
        finish(tx, result).await
    }

    async fn update(&self, id: Uuid, patch: SongPatch) -> StoreResult<Song> {
        let mut conn = self.checked_connection().await?;
        let mut tx = conn.begin_with(BEGIN_WRITE).await?;
        let result = update_in(&mut tx, id, patch).await;
        finish(tx, result).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut conn = self.checked_connection().await?;
        let mut tx = conn.begin_with(BEGIN_WRITE).await?;
        let result = delete_in(&mut tx, id).await;
        finish(tx, result).await
    }

    async fn list(
        &self,
        predicates: &[Predicate],
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Song>> {
        let mut conn = self.checked_connection().await?;
        let mut tx = conn.begin().await?;
        let result = list_in(&mut tx, predicates, limit, offset).await;
        finish(tx, result).await
    }

    async fn text(&self, id: Uuid) -> StoreResult<String> {
        let mut conn = self.checked_connection().await?;
        let mut tx = conn.begin().await?;
        let result = text_in(&mut tx, id).await;
        finish(tx, result).await
    }
}
