//! HTTP enrichment provider client
//!
//! `GET {base_url}/info?group=<group>&song=<title>`; a 2xx response carries
//! `{"releaseDate": "DD.MM.YYYY", "text": ..., "link": ...}`.

use async_trait::async_trait;
use std::time::Duration;

use super::{EnrichedSong, EnrichmentClient, EnrichmentError, ProviderDetails};

const USER_AGENT: &str = concat!("songlib-catalog/", env!("CARGO_PKG_VERSION"));

/// Remote metadata provider client
pub struct HttpEnrichmentClient {
    http_client: reqwest::Client,
    info_url: String,
}

impl HttpEnrichmentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            info_url: format!("{}/info", base_url.trim_end_matches('/')),
        })
    }

    /// Full URL of the lookup endpoint
    pub fn info_url(&self) -> &str {
        &self.info_url
    }
}

#[async_trait]
impl EnrichmentClient for HttpEnrichmentClient {
    fn provider_name(&self) -> &'static str {
        "http"
    }

    async fn lookup(&self, group: &str, title: &str) -> Result<EnrichedSong, EnrichmentError> {
        tracing::debug!(url = %self.info_url, group, title, "Querying enrichment provider");

        let response = self
            .http_client
            .get(&self.info_url)
            .query(&[("group", group), ("song", title)])
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::Status(status.as_u16(), error_text));
        }

        let details: ProviderDetails = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Decode(e.to_string()))?;

        details.into_enriched()
    }
}
