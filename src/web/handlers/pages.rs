//! Page and static asset handlers
//!
//! `index.html` and `player.html` are read from the static directory on each
//! request and have their password placeholders filled in. Everything else
//! falls through to `ServeDir`.

use std::path::Path;

use axum::{
    body::Body,
    extract::{Request, State},
    response::{Html, IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::web::AppState;

const INDEX_PAGE: &str = "index.html";
const PLAYER_PAGE: &str = "player.html";
/// Shareable search links (`/s=<query>`) open the index page
const SEARCH_LINK_PREFIX: &str = "/s=";

/// GET / and /index.html
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    render_page(&state, INDEX_PAGE).await
}

/// GET /player.html
pub async fn player(State(state): State<AppState>) -> AppResult<Html<String>> {
    render_page(&state, PLAYER_PAGE).await
}

/// Fallback for every unrouted path
pub async fn fallback(State(state): State<AppState>, request: Request) -> Response {
    if request.uri().path().starts_with(SEARCH_LINK_PREFIX) {
        return render_page(&state, INDEX_PAGE).await.into_response();
    }

    let static_dir = &state.config.web.static_dir;
    match ServeDir::new(static_dir).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(infallible) => match infallible {},
    }
}

async fn render_page(state: &AppState, page: &str) -> AppResult<Html<String>> {
    let template = read_template(&state.config.web.static_dir, page).await?;
    Ok(Html(state.secrets.render(&template)))
}

async fn read_template(static_dir: &Path, page: &str) -> AppResult<String> {
    let path = static_dir.join(page);
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        debug!("Page template {} unavailable: {}", path.display(), e);
        AppError::not_found("page", page)
    })
}
