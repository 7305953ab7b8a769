//! Shared fixtures: mock upstream catalogs and a configured test server
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Json, Router, extract::Query, http::StatusCode, response::IntoResponse, routing::get};
use axum_test::TestServer;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use catalog_relay::{
    config::{Config, SourceConfig},
    web::{AppState, WebServer},
};

pub const CATALOG_PATH: &str = "/api.php/provide/vod";
pub const PLAY_URL: &str =
    "EP1$http://cdn.test/1.m3u8#http://cdn.test/2.m3u8$$$Alt$http://alt.test/1.m3u8";

/// Serve `router` on an ephemeral localhost port
pub async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A port nothing listens on
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Accepts connections and never answers; counts accepted connections
pub async fn silent_upstream() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });
    (addr, accepted)
}

/// Catalog API answering `ac=videolist` queries with `movies` as (title, year)
///
/// `ids=missing` yields an empty list; any other id yields one record with
/// a two-group play URL. Category queries report 5 pages and 100 items.
pub fn mock_catalog(label: &'static str, movies: &'static [(&'static str, &'static str)]) -> Router {
    Router::new().route(
        CATALOG_PATH,
        get(move |Query(params): Query<HashMap<String, String>>| async move {
            if params.get("ac").map(String::as_str) != Some("videolist") {
                return (StatusCode::BAD_REQUEST, "unsupported action").into_response();
            }

            if let Some(id) = params.get("ids") {
                if id == "missing" {
                    return Json(json!({"code": 1, "list": []})).into_response();
                }
                return Json(json!({
                    "code": 1,
                    "list": [{
                        "vod_id": id,
                        "vod_name": format!("{label} detail"),
                        "vod_year": "2020",
                        "vod_content": "A long description.",
                        "vod_play_url": PLAY_URL,
                    }]
                }))
                .into_response();
            }

            let list: Vec<Value> = movies
                .iter()
                .enumerate()
                .map(|(i, (title, year))| {
                    json!({
                        "vod_id": i + 1,
                        "vod_name": title,
                        "vod_year": year,
                        "vod_pic": format!("http://img.test/{label}/{i}.jpg"),
                        "type_name": "Drama",
                        "vod_remarks": "HD",
                        "vod_play_url": PLAY_URL,
                    })
                })
                .collect();

            if params.contains_key("t") {
                return Json(json!({
                    "code": 1,
                    "page": params.get("pg").cloned().unwrap_or_default(),
                    "pagecount": 5,
                    "total": "100",
                    "list": list,
                }))
                .into_response();
            }

            Json(json!({"code": 1, "list": list})).into_response()
        }),
    )
}

pub fn source(key: &str, addr: SocketAddr, adult: bool) -> SourceConfig {
    SourceConfig {
        key: key.to_string(),
        name: format!("{key} catalog"),
        api: format!("http://{addr}{CATALOG_PATH}"),
        adult,
        detail: None,
    }
}

/// Config pointing at `sources`, with the relay allowed to reach localhost
pub fn test_config(sources: Vec<SourceConfig>) -> Config {
    let mut config = Config::default();
    config.catalog.default_source = sources[0].key.clone();
    config.sources = sources;
    config.relay.blocked_hosts = Vec::new();
    config.relay.blocked_ip_prefixes = Vec::new();
    config.relay.timeout = Duration::from_secs(2);
    config.relay.max_retries = 0;
    config
}

pub fn test_server(config: Config) -> TestServer {
    let state = AppState::from_config(config).unwrap();
    let router = WebServer::create_router(state).unwrap();
    TestServer::new(router).unwrap()
}
