//! Catalog service error taxonomy
//!
//! Every variant names the operation that failed so the boundary can report
//! it without inspecting the source chain.

use thiserror::Error;
use uuid::Uuid;

use crate::enrichment::EnrichmentError;
use crate::store::StoreError;

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed caller input
    #[error("{operation}: invalid input: {message}")]
    Validation {
        operation: &'static str,
        message: String,
    },

    /// Operation targets a nonexistent song
    #[error("{operation}: song {id} not found")]
    NotFound { operation: &'static str, id: Uuid },

    /// Uniqueness violation, e.g. duplicate link
    #[error("{operation}: conflict: {message}")]
    Conflict {
        operation: &'static str,
        message: String,
    },

    /// External lookup failed or returned a non-success status
    #[error("{operation}: enrichment failed for '{group}' / '{title}': {source}")]
    Enrichment {
        operation: &'static str,
        group: String,
        title: String,
        #[source]
        source: EnrichmentError,
    },

    /// Provider sent a malformed release date
    #[error("{operation}: {source}")]
    Parse {
        operation: &'static str,
        #[source]
        source: EnrichmentError,
    },

    /// Page outside 1..=total_pages (zero-verse text has no valid page)
    #[error("{operation}: page {page} of song {id} is out of range (total pages: {total_pages})")]
    InvalidPage {
        operation: &'static str,
        id: Uuid,
        page: usize,
        total_pages: usize,
    },

    /// Unit of work failed for a reason other than a conflict
    #[error("{operation}: persistence failure: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// Caller cancelled the operation
    #[error("{operation}: cancelled")]
    Cancelled { operation: &'static str },
}

impl CatalogError {
    /// Classify a store failure
    pub fn from_store(operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CatalogError::NotFound { operation, id },
            StoreError::Conflict(message) => CatalogError::Conflict { operation, message },
            other => CatalogError::Persistence {
                operation,
                source: other,
            },
        }
    }

    /// Classify an enrichment failure
    pub fn from_enrichment(
        operation: &'static str,
        group: &str,
        title: &str,
        err: EnrichmentError,
    ) -> Self {
        match err {
            EnrichmentError::Date(_) => CatalogError::Parse {
                operation,
                source: err,
            },
            other => CatalogError::Enrichment {
                operation,
                group: group.to_string(),
                title: title.to_string(),
                source: other,
            },
        }
    }

    /// Name of the operation that failed
    pub fn operation(&self) -> &'static str {
        match self {
            CatalogError::Validation { operation, .. }
            | CatalogError::NotFound { operation, .. }
            | CatalogError::Conflict { operation, .. }
            | CatalogError::Enrichment { operation, .. }
            | CatalogError::Parse { operation, .. }
            | CatalogError::InvalidPage { operation, .. }
            | CatalogError::Persistence { operation, .. }
            | CatalogError::Cancelled { operation } => *operation,
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
