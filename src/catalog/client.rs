use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::catalog::{
    api_types::{Paged, RawDetails, RawProviders, RawSummary},
    dto::{region_providers, search_results, MediaDetails, MediaKind, MediaSummary, Provider},
};
use crate::config::TmdbConfig;

/// Read-only view of the remote movie/TV catalog.
///
/// Implementations fail closed: an unreachable or misbehaving upstream
/// shows up as an empty list or `None`, never as an error.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn trending(&self) -> Vec<MediaSummary>;
    async fn top_rated(&self) -> Vec<MediaSummary>;
    async fn search(&self, query: &str) -> Vec<MediaSummary>;
    async fn details(&self, kind: MediaKind, id: i64) -> Option<MediaDetails>;
    async fn watch_providers(&self, kind: MediaKind, id: i64) -> Vec<Provider>;
}

#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    api_key: String,
    base_url: String,
    region: String,
}

impl TmdbClient {
    pub fn new(cfg: &TmdbConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("failed to build catalog http client")?;
        if cfg.api_key.is_empty() {
            warn!("TMDB_API_KEY is empty; catalog requests will fail");
        }
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            region: cfg.watch_region.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            // reqwest errors embed the full URL, key included
            .map_err(|e| anyhow::anyhow!("request to {} failed: {}", path, e.without_url()))?;

        let status = res.status();
        if !status.is_success() {
            anyhow::bail!("{} returned {}", path, status);
        }

        let text = res
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("reading {} failed: {}", path, e.without_url()))?;
        serde_json::from_str(&text).with_context(|| format!("unable to decode {}", path))
    }

    async fn list(
        &self,
        path: &str,
        query: &[(&str, &str)],
        fallback: MediaKind,
    ) -> Vec<MediaSummary> {
        match self.get_json::<Paged<RawSummary>>(path, query).await {
            Ok(page) => {
                debug!(path, count = page.results.len(), "catalog list fetched");
                page.results
                    .into_iter()
                    .filter_map(|r| MediaSummary::from_raw(r, fallback))
                    .collect()
            }
            Err(e) => {
                warn!(error = %e, "catalog list unavailable");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    #[instrument(skip(self))]
    async fn trending(&self) -> Vec<MediaSummary> {
        self.list("/trending/movie/week", &[], MediaKind::Movie).await
    }

    #[instrument(skip(self))]
    async fn top_rated(&self) -> Vec<MediaSummary> {
        self.list("/movie/top_rated", &[], MediaKind::Movie).await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Vec<MediaSummary> {
        match self
            .get_json::<Paged<RawSummary>>("/search/multi", &[("query", query)])
            .await
        {
            Ok(page) => search_results(page.results),
            Err(e) => {
                warn!(error = %e, "catalog search unavailable");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    async fn details(&self, kind: MediaKind, id: i64) -> Option<MediaDetails> {
        let path = format!("/{}/{}", kind.as_path(), id);
        match self
            .get_json::<RawDetails>(&path, &[("append_to_response", "credits,videos")])
            .await
        {
            Ok(raw) => Some(MediaDetails::from_raw(raw, kind)),
            Err(e) => {
                warn!(error = %e, "catalog details unavailable");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn watch_providers(&self, kind: MediaKind, id: i64) -> Vec<Provider> {
        let path = format!("/{}/{}/watch/providers", kind.as_path(), id);
        match self.get_json::<RawProviders>(&path, &[]).await {
            Ok(raw) => region_providers(raw, &self.region),
            Err(e) => {
                warn!(error = %e, "watch providers unavailable");
                Vec::new()
            }
        }
    }
}
