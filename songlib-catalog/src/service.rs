//! Catalog service
//!
//! Orchestrates enrichment, persistence, filtering and verse pagination for
//! the five catalog operations. Holds no per-record state between calls.
//!
//! **Cancellation:** every operation takes an [`OpContext`]. An operation whose
//! token is already cancelled returns `Cancelled` without touching the store
//! or the provider. Each store or provider call races the token; losing the
//! race drops the in-flight call, which rolls back any open transaction.
//!
//! **Concurrency:** no locking here. Two updates of the same song race at the
//! store and the last commit wins.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::enrichment::EnrichmentClient;
use crate::error::{CatalogError, CatalogResult};
use crate::filter::{build_predicates, SongFilter};
use crate::models::{Song, SongPatch};
use crate::store::CatalogStore;
use crate::verses::{paginate, PageError};

/// Request-scoped context: cancellation plus a request id for tracing
#[derive(Debug, Clone)]
pub struct OpContext {
    cancel: CancellationToken,
    request_id: Uuid,
}

impl OpContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            request_id: Uuid::new_v4(),
        }
    }

    /// Context with its own token, never cancelled unless asked to
    pub fn detached() -> Self {
        Self::new(CancellationToken::new())
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    fn ensure_active(&self, operation: &'static str) -> CatalogResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CatalogError::Cancelled { operation });
        }
        Ok(())
    }

    /// Run `fut` unless the token fires first
    async fn guard<F: Future>(&self, operation: &'static str, fut: F) -> CatalogResult<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CatalogError::Cancelled { operation }),
            output = fut => Ok(output),
        }
    }
}

/// Catalog business logic
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    enrichment: Arc<dyn EnrichmentClient>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, enrichment: Arc<dyn EnrichmentClient>) -> Self {
        Self { store, enrichment }
    }

    /// Enrich `group`/`title` and persist the new song
    ///
    /// Returns the generated id. Nothing is written when enrichment fails.
    pub async fn create_song(&self, ctx: &OpContext, group: &str, title: &str) -> CatalogResult<Uuid> {
        const OP: &str = "create_song";
        let span = tracing::info_span!("create_song", request_id = %ctx.request_id(), group, title);

        async move {
            ctx.ensure_active(OP)?;

            let group = group.trim();
            let title = title.trim();
            if group.is_empty() || title.is_empty() {
                return Err(CatalogError::Validation {
                    operation: OP,
                    message: "group and song title are required".to_string(),
                });
            }

            let details = ctx
                .guard(OP, self.enrichment.lookup(group, title))
                .await?
                .map_err(|e| {
                    warn!(provider = self.enrichment.provider_name(), error = %e, "Enrichment failed");
                    CatalogError::from_enrichment(OP, group, title, e)
                })?;

            let song = Song::from_enrichment(group.to_string(), title.to_string(), details);

            ctx.guard(OP, self.store.insert(&song))
                .await?
                .map_err(|e| log_store_error(CatalogError::from_store(OP, e)))?;

            info!(song_id = %song.id, "Song created");
            Ok(song.id)
        }
        .instrument(span)
        .await
    }

    /// Merge `patch` over the stored song and return the result
    pub async fn update_song(&self, ctx: &OpContext, id: Uuid, patch: SongPatch) -> CatalogResult<Song> {
        const OP: &str = "update_song";
        let span = tracing::info_span!("update_song", request_id = %ctx.request_id(), song_id = %id);

        async move {
            ctx.ensure_active(OP)?;

            if let Some(field) = patch.blank_required_field() {
                return Err(CatalogError::Validation {
                    operation: OP,
                    message: format!("{} cannot be empty", field),
                });
            }

            let song = ctx
                .guard(OP, self.store.update(id, patch))
                .await?
                .map_err(|e| log_store_error(CatalogError::from_store(OP, e)))?;

            info!("Song updated");
            Ok(song)
        }
        .instrument(span)
        .await
    }

    /// Delete a song; deleting an absent song is `NotFound`
    pub async fn delete_song(&self, ctx: &OpContext, id: Uuid) -> CatalogResult<()> {
        const OP: &str = "delete_song";
        let span = tracing::info_span!("delete_song", request_id = %ctx.request_id(), song_id = %id);

        async move {
            ctx.ensure_active(OP)?;

            ctx.guard(OP, self.store.delete(id))
                .await?
                .map_err(|e| log_store_error(CatalogError::from_store(OP, e)))?;

            info!("Song deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Songs matching every set field of `filter`
    ///
    /// Order is the store's default; callers needing a stable order must
    /// narrow the filter.
    pub async fn list_songs(
        &self,
        ctx: &OpContext,
        filter: &SongFilter,
        limit: u32,
        offset: u32,
    ) -> CatalogResult<Vec<Song>> {
        const OP: &str = "list_songs";
        let span = tracing::info_span!("list_songs", request_id = %ctx.request_id(), limit, offset);

        async move {
            ctx.ensure_active(OP)?;

            let predicates = build_predicates(filter);
            debug!(predicates = predicates.len(), "Listing songs");

            let songs = ctx
                .guard(OP, self.store.list(&predicates, limit, offset))
                .await?
                .map_err(|e| log_store_error(CatalogError::from_store(OP, e)))?;

            debug!(returned = songs.len(), "Listed songs");
            Ok(songs)
        }
        .instrument(span)
        .await
    }

    /// One page of verses of a song's lyrics, flattened into lines
    pub async fn get_verses(
        &self,
        ctx: &OpContext,
        id: Uuid,
        page: usize,
        page_size: usize,
    ) -> CatalogResult<Vec<String>> {
        const OP: &str = "get_verses";
        let span = tracing::info_span!("get_verses", request_id = %ctx.request_id(), song_id = %id, page, page_size);

        async move {
            ctx.ensure_active(OP)?;

            if page_size == 0 {
                return Err(CatalogError::Validation {
                    operation: OP,
                    message: "page_size must be at least 1".to_string(),
                });
            }

            let text = ctx
                .guard(OP, self.store.text(id))
                .await?
                .map_err(|e| log_store_error(CatalogError::from_store(OP, e)))?;

            let selected = paginate(&text, page, page_size).map_err(|e| match e {
                PageError::ZeroPageSize => CatalogError::Validation {
                    operation: OP,
                    message: e.to_string(),
                },
                PageError::OutOfRange { page, total_pages } => CatalogError::InvalidPage {
                    operation: OP,
                    id,
                    page,
                    total_pages,
                },
            })?;

            debug!(
                total_pages = selected.total_pages,
                lines = selected.lines.len(),
                "Selected verse page"
            );
            Ok(selected.lines)
        }
        .instrument(span)
        .await
    }
}

/// Log a store failure once, at a level matching its kind
fn log_store_error(err: CatalogError) -> CatalogError {
    match &err {
        CatalogError::NotFound { .. } => debug!(error = %err, "Song not found"),
        CatalogError::Conflict { .. } => warn!(error = %err, "Uniqueness conflict"),
        _ => tracing::error!(error = %err, "Store operation failed"),
    }
    err
}
