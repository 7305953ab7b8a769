//! Multi-source catalog aggregation
//!
//! Every upstream call goes through `RetryingFetcher::fetch_json`. In the
//! fan-out paths a failing source is logged and contributes nothing; only
//! single-source operations surface upstream errors to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use futures::{StreamExt, future::join_all, stream::FuturesUnordered};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CatalogConfig;
use crate::errors::{AppError, AppResult, FetchResult};
use crate::models::{CanonicalMovie, Pagination, VodListResponse};
use crate::services::normalizer::{normalize_all, normalize_detail};
use crate::sources::{SourceEntry, SourceRegistry, find_category};
use crate::utils::RetryingFetcher;

/// Merged result of a search across every visible source
#[derive(Debug, Clone)]
pub struct AggregatedSearch {
    pub movies: Vec<CanonicalMovie>,
    /// Number of sources queried, failed ones included
    pub sources_queried: usize,
}

#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub movies: Vec<CanonicalMovie>,
    pub pagination: Pagination,
}

pub struct CatalogAggregator {
    registry: Arc<SourceRegistry>,
    fetcher: RetryingFetcher,
    settings: CatalogConfig,
}

impl CatalogAggregator {
    pub fn new(registry: Arc<SourceRegistry>, fetcher: RetryingFetcher, settings: CatalogConfig) -> Self {
        Self {
            registry,
            fetcher,
            settings,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn default_source(&self) -> &str {
        &self.settings.default_source
    }

    /// Search one source; upstream failures are returned to the caller
    pub async fn search_source(&self, query: &str, source_key: &str) -> AppResult<Vec<CanonicalMovie>> {
        let query = require_query(query)?;
        let source = self.registry.require(source_key)?;

        let response = self
            .fetch_list(source.query_endpoint.clone(), &[("wd", query)])
            .await
            .map_err(|e| {
                warn!("Search on source '{}' failed: {}", source.key, e);
                AppError::upstream(format!("Search on source '{}' failed", source.key), e)
            })?;

        Ok(normalize_all(&response.list, source))
    }

    /// Search every visible source concurrently and merge the results
    ///
    /// Results are concatenated in source completion order, duplicates by
    /// (title, year) are dropped keeping the first seen, and the list is
    /// capped at `search_result_cap`.
    pub async fn search_all(&self, query: &str, include_adult: bool) -> AppResult<AggregatedSearch> {
        let query = require_query(query)?;
        let sources: Vec<&SourceEntry> = self.registry.visible(include_adult).collect();
        let sources_queried = sources.len();

        let batches: Vec<Vec<CanonicalMovie>> = sources
            .into_iter()
            .map(|source| self.search_branch(source, query))
            .collect::<FuturesUnordered<_>>()
            .collect()
            .await;

        let mut movies = dedup_by_title_year(batches.into_iter().flatten());
        movies.truncate(self.settings.search_result_cap);

        info!(
            "Aggregated search for '{}' returned {} results from {} sources",
            query,
            movies.len(),
            sources_queried
        );

        Ok(AggregatedSearch {
            movies,
            sources_queried,
        })
    }

    /// Random sample of recent listings from the first few visible sources
    pub async fn recommendations(&self, include_adult: bool) -> Vec<CanonicalMovie> {
        let sources: Vec<&SourceEntry> = self
            .registry
            .visible(include_adult)
            .take(self.settings.recommendation_sources)
            .collect();

        let batches = join_all(sources.into_iter().map(|source| self.recent_listings(source))).await;

        let mut movies: Vec<CanonicalMovie> = batches.into_iter().flatten().collect();
        movies.shuffle(&mut rand::rng());
        movies.truncate(self.settings.recommendation_cap);

        debug!("Serving {} recommendations", movies.len());
        movies
    }

    /// Full record for one id, with episodes parsed
    pub async fn detail(&self, id: &str, source_key: &str) -> AppResult<CanonicalMovie> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::validation("Missing movie id"));
        }
        let source = self.registry.require(source_key)?;

        let response = self
            .fetch_list(source.detail_endpoint().clone(), &[("ids", id)])
            .await
            .map_err(|e| {
                warn!("Detail lookup for '{}' on source '{}' failed: {}", id, source.key, e);
                AppError::upstream(format!("Detail lookup on source '{}' failed", source.key), e)
            })?;

        let record = response
            .list
            .iter()
            .find(|record| record.vod_id.as_deref().is_none_or(|vod_id| vod_id.trim() == id))
            .ok_or_else(|| AppError::not_found("movie", id))?;

        Ok(normalize_detail(record, source))
    }

    /// One page of a category listing from a single source
    pub async fn category(&self, type_code: &str, page: u32, source_key: Option<&str>) -> AppResult<CategoryPage> {
        let category = find_category(type_code)
            .ok_or_else(|| AppError::validation(format!("Invalid category: {type_code}")))?;
        if page == 0 {
            return Err(AppError::validation("Page numbers start at 1"));
        }
        let source = self
            .registry
            .require(source_key.unwrap_or(&self.settings.default_source))?;

        let page_param = page.to_string();
        let response = self
            .fetch_list(
                source.query_endpoint.clone(),
                &[("t", category.code), ("pg", page_param.as_str())],
            )
            .await
            .map_err(|e| {
                warn!("Category {} listing on source '{}' failed: {}", category.code, source.key, e);
                AppError::upstream(format!("Category listing on source '{}' failed", source.key), e)
            })?;

        let movies = normalize_all(&response.list, source);
        let pagination = Pagination {
            current_page: page,
            total_pages: response
                .pagecount
                .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
                .unwrap_or(1),
            total_items: response.total.unwrap_or(movies.len() as u64),
        };

        Ok(CategoryPage { movies, pagination })
    }

    /// One aggregated-search branch; failures resolve to an empty list
    async fn search_branch(&self, source: &SourceEntry, query: &str) -> Vec<CanonicalMovie> {
        match self
            .fetch_list(source.query_endpoint.clone(), &[("wd", query)])
            .await
        {
            Ok(response) => normalize_all(&response.list, source),
            Err(e) => {
                warn!("Source '{}' failed during aggregated search: {}", source.key, e);
                Vec::new()
            }
        }
    }

    /// Listing pages fetched in order, stopping at the first failing page
    ///
    /// Records from pages fetched before the failure are kept.
    async fn recent_listings(&self, source: &SourceEntry) -> Vec<CanonicalMovie> {
        let mut movies = Vec::new();
        for page in 1..=self.settings.recommendation_pages {
            let page_param = page.to_string();
            match self
                .fetch_list(source.query_endpoint.clone(), &[("pg", page_param.as_str())])
                .await
            {
                Ok(response) => movies.extend(normalize_all(&response.list, source)),
                Err(e) => {
                    warn!(
                        "Recommendations from source '{}' stop at page {}: {}",
                        source.key, page, e
                    );
                    break;
                }
            }
        }
        movies
    }

    async fn fetch_list(&self, endpoint: Url, params: &[(&str, &str)]) -> FetchResult<VodListResponse> {
        let url = videolist_url(endpoint, params);
        self.fetcher.fetch_json(url.as_str()).await
    }
}

/// Append `ac=videolist` and `params` to a source endpoint
pub fn videolist_url(mut endpoint: Url, params: &[(&str, &str)]) -> Url {
    {
        let mut query = endpoint.query_pairs_mut();
        query.append_pair("ac", "videolist");
        for (name, value) in params {
            query.append_pair(name, value);
        }
    }
    endpoint
}

/// Keep the first movie seen for each (title, year) pair, in order
pub fn dedup_by_title_year<I>(movies: I) -> Vec<CanonicalMovie>
where
    I: IntoIterator<Item = CanonicalMovie>,
{
    let mut seen: HashSet<(String, String)> = HashSet::new();
    movies
        .into_iter()
        .filter(|movie| {
            let (title, year) = movie.dedup_key();
            seen.insert((title.to_string(), year.to_string()))
        })
        .collect()
}

fn require_query(query: &str) -> AppResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::validation("Missing search query"));
    }
    Ok(query)
}
