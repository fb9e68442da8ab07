//! Shared test fixtures for songlib-catalog integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use songlib_catalog::enrichment::{
    EnrichedSong, EnrichmentClient, EnrichmentError, ProviderDetails,
};
use songlib_catalog::filter::Predicate;
use songlib_catalog::models::{Song, SongPatch};
use songlib_catalog::store::{CatalogStore, SqliteCatalogStore, StoreResult};
use songlib_catalog::CatalogService;
use songlib_common::db::init_database;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Lyrics with three verses, the second holding two lines
pub const THREE_VERSES: &str = "line1\n\nline2a\nline2b\n\nline3";

/// Create a temporary database with the catalog schema applied
///
/// The TempDir must be kept alive for the duration of the test.
pub async fn create_test_db() -> (TempDir, PathBuf, SqlitePool) {
    let temp_dir = TempDir::new().expect("Should create temp dir");
    let db_path = temp_dir.path().join("test_songlib.db");
    let pool = init_database(&db_path)
        .await
        .expect("Should initialize test database");
    (temp_dir, db_path, pool)
}

/// Provider details as the remote provider would send them
pub fn details(release_date: &str, text: &str, link: &str) -> ProviderDetails {
    ProviderDetails {
        release_date: release_date.to_string(),
        text: text.to_string(),
        link: link.to_string(),
    }
}

/// Enrichment client answering from an in-memory table and counting calls
#[derive(Default)]
pub struct StubEnrichment {
    songs: Mutex<HashMap<(String, String), ProviderDetails>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubEnrichment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_song(self, group: &str, title: &str, details: ProviderDetails) -> Self {
        self.songs
            .lock()
            .unwrap()
            .insert((group.to_string(), title.to_string()), details);
        self
    }

    /// Hold every lookup for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnrichmentClient for StubEnrichment {
    fn provider_name(&self) -> &'static str {
        "stub"
    }

    async fn lookup(&self, group: &str, title: &str) -> Result<EnrichedSong, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let found = self
            .songs
            .lock()
            .unwrap()
            .get(&(group.to_string(), title.to_string()))
            .cloned();

        match found {
            Some(details) => details.into_enriched(),
            None => Err(EnrichmentError::Status(400, "Song not found".to_string())),
        }
    }
}

/// Store wrapper counting every call that reaches the inner store
pub struct CountingStore {
    inner: Arc<dyn CatalogStore>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for CountingStore {
    async fn insert(&self, song: &Song) -> StoreResult<()> {
        self.hit();
        self.inner.insert(song).await
    }

    async fn update(&self, id: Uuid, patch: SongPatch) -> StoreResult<Song> {
        self.hit();
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.hit();
        self.inner.delete(id).await
    }

    async fn list(
        &self,
        predicates: &[Predicate],
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Song>> {
        self.hit();
        self.inner.list(predicates, limit, offset).await
    }

    async fn text(&self, id: Uuid) -> StoreResult<String> {
        self.hit();
        self.inner.text(id).await
    }
}

/// Service wired to a fresh SQLite store and the given provider
pub struct TestCatalog {
    pub _temp_dir: TempDir,
    pub db_path: PathBuf,
    pub pool: SqlitePool,
    pub store: Arc<CountingStore>,
    pub enrichment: Arc<StubEnrichment>,
    pub service: CatalogService,
}

pub async fn test_catalog(enrichment: StubEnrichment) -> TestCatalog {
    let (temp_dir, db_path, pool) = create_test_db().await;
    let store = Arc::new(CountingStore::new(Arc::new(SqliteCatalogStore::new(
        pool.clone(),
    ))));
    let enrichment = Arc::new(enrichment);
    let service = CatalogService::new(store.clone(), enrichment.clone());

    TestCatalog {
        _temp_dir: temp_dir,
        db_path,
        pool,
        store,
        enrichment,
        service,
    }
}

/// Provider that knows the three songs used across the tests
pub fn standard_enrichment() -> StubEnrichment {
    StubEnrichment::new()
        .with_song(
            "Muse",
            "Supermassive Black Hole",
            details(
                "16.07.2006",
                "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\nYou caught me under false pretenses",
                "https://www.youtube.com/watch?v=Xsp3_a-PMTw",
            ),
        )
        .with_song(
            "Enigma",
            "Sadeness",
            details("01.10.1990", THREE_VERSES, "https://example.com/sadeness"),
        )
        .with_song(
            "Muse",
            "Uprising",
            details("07.09.2009", "", "https://example.com/uprising"),
        )
}
