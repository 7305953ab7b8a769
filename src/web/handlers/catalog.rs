//! Catalog API handlers
//!
//! Thin wrappers over `CatalogAggregator`; all shaping of upstream data
//! happens in the service layer.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::errors::AppResult;
use crate::sources::{CATEGORIES, SourceSummary};
use crate::web::{
    AppState,
    extractors::{AdultFilterParams, CategoryParams, SearchParams, SourceParams},
    responses::{CategoryResponse, SearchResponse, ok},
};

/// GET /api/recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<AdultFilterParams>,
) -> impl IntoResponse {
    ok(state.aggregator.recommendations(params.include_adult).await)
}

/// GET /api/search
///
/// `aggregated=true` fans out to every visible source and ignores `source`.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let query = params.q.as_deref().unwrap_or_default();

    if params.aggregated {
        let merged = state.aggregator.search_all(query, params.include_adult).await?;
        return Ok(Json(SearchResponse::aggregated(
            merged.movies,
            merged.sources_queried,
        )));
    }

    let source = params
        .source
        .as_deref()
        .unwrap_or(state.aggregator.default_source());
    let movies = state.aggregator.search_source(query, source).await?;
    Ok(Json(SearchResponse::single(movies)))
}

/// GET /api/movie/{id}
pub async fn movie_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SourceParams>,
) -> AppResult<impl IntoResponse> {
    let source = params
        .source
        .as_deref()
        .unwrap_or(state.aggregator.default_source());
    let movie = state.aggregator.detail(&id, source).await?;
    Ok(ok(movie))
}

/// GET /api/sources
pub async fn list_sources(
    State(state): State<AppState>,
    Query(params): Query<AdultFilterParams>,
) -> impl IntoResponse {
    let sources: Vec<SourceSummary> = state
        .aggregator
        .registry()
        .visible(params.include_adult)
        .map(SourceSummary::from)
        .collect();
    ok(sources)
}

/// GET /api/categories
pub async fn list_categories() -> impl IntoResponse {
    ok(CATEGORIES)
}

/// GET /api/category/{type}
pub async fn category_listing(
    State(state): State<AppState>,
    Path(type_code): Path<String>,
    Query(params): Query<CategoryParams>,
) -> AppResult<Json<CategoryResponse>> {
    let page = state
        .aggregator
        .category(&type_code, params.page()?, params.source.as_deref())
        .await?;

    Ok(Json(CategoryResponse {
        success: true,
        data: page.movies,
        pagination: page.pagination,
    }))
}
