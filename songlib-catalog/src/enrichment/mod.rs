//! Song metadata enrichment
//!
//! Looks up release date, lyrics and reference link for a group/title pair.
//! The provider strategy is chosen once at startup from configuration:
//! - [`HttpEnrichmentClient`]: remote provider over HTTP
//! - [`FixtureEnrichmentClient`]: in-process canned catalogue
//!
//! Lookups are plain request/response: no retry, no caching.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use songlib_common::config::{EnrichmentConfig, ProviderKind};

pub mod fixture;
pub mod http;

pub use fixture::FixtureEnrichmentClient;
pub use http::HttpEnrichmentClient;

/// Release date format used by the provider (day.month.year)
pub const RELEASE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Enrichment client errors
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned status {0}: {1}")]
    Status(u16, String),

    #[error("Undecodable provider response: {0}")]
    Decode(String),

    #[error("Incomplete provider response: {0}")]
    Incomplete(String),

    #[error("Malformed release date '{0}'")]
    Date(String),
}

/// Metadata returned by a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedSong {
    pub release_date: NaiveDate,
    pub text: String,
    pub link: String,
}

/// Provider response body
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetails {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl ProviderDetails {
    /// Validate and convert the wire form into domain metadata
    pub fn into_enriched(self) -> Result<EnrichedSong, EnrichmentError> {
        let release_date = parse_release_date(&self.release_date)?;

        if self.link.trim().is_empty() {
            return Err(EnrichmentError::Incomplete("empty link".to_string()));
        }

        Ok(EnrichedSong {
            release_date,
            text: self.text,
            link: self.link,
        })
    }
}

/// Parse a provider release date such as `16.07.2006`
pub fn parse_release_date(value: &str) -> Result<NaiveDate, EnrichmentError> {
    NaiveDate::parse_from_str(value.trim(), RELEASE_DATE_FORMAT)
        .map_err(|_| EnrichmentError::Date(value.to_string()))
}

/// Metadata lookup contract
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// Provider identifier for logs (e.g. "http", "fixture")
    fn provider_name(&self) -> &'static str;

    /// Look up metadata for a group/title pair
    async fn lookup(&self, group: &str, title: &str) -> Result<EnrichedSong, EnrichmentError>;
}

/// Build the configured provider strategy
pub fn client_from_config(
    config: &EnrichmentConfig,
) -> songlib_common::Result<Arc<dyn EnrichmentClient>> {
    match config.provider {
        ProviderKind::Http => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                songlib_common::Error::Config(
                    "enrichment.base_url is required for the http provider".to_string(),
                )
            })?;
            let client =
                HttpEnrichmentClient::new(base_url, Duration::from_secs(config.timeout_secs))
                    .map_err(|e| songlib_common::Error::Config(e.to_string()))?;
            Ok(Arc::new(client))
        }
        ProviderKind::Fixture => Ok(Arc::new(FixtureEnrichmentClient::new())),
    }
}
