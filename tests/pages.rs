//! Page templating, static files and response middleware

mod common;

use axum::http::{HeaderValue, StatusCode, header};
use tempfile::TempDir;

use catalog_relay::config::Config;
use catalog_relay::utils::secrets::sha256_hex;
use common::{closed_port, source, test_config, test_server};

const INDEX_TEMPLATE: &str =
    "<html><script>window.__PW = '{{PASSWORD}}'; window.__ADMIN = '{{ADMINPASSWORD}}';</script></html>";

async fn site_config() -> (Config, TempDir) {
    let site = TempDir::new().unwrap();
    std::fs::write(site.path().join("index.html"), INDEX_TEMPLATE).unwrap();
    std::fs::write(site.path().join("app.js"), "console.log('ready');").unwrap();

    let catalog = closed_port().await;
    let mut config = test_config(vec![source("primary", catalog, false)]);
    config.web.static_dir = site.path().to_path_buf();
    (config, site)
}

#[tokio::test]
async fn index_gets_password_digests() {
    let (mut config, _site) = site_config().await;
    config.auth.password = Some("hunter2".to_string());
    let server = test_server(config);

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains(&format!("window.__PW = '{}'", sha256_hex("hunter2"))));
    assert!(html.contains("window.__ADMIN = ''"));
    assert!(!html.contains("{{PASSWORD}}"));
}

#[tokio::test]
async fn unset_password_renders_empty_placeholder() {
    let (config, _site) = site_config().await;
    let server = test_server(config);

    let html = server.get("/index.html").await.text();
    assert!(html.contains("window.__PW = ''"));
}

#[tokio::test]
async fn search_links_serve_the_index_page() {
    let (config, _site) = site_config().await;
    let server = test_server(config);

    let response = server.get("/s=night%20train").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().starts_with("<html>"));
}

#[tokio::test]
async fn missing_template_is_a_404() {
    let (config, _site) = site_config().await;
    let server = test_server(config);

    let response = server.get("/player.html").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_paths_are_served_from_static_dir() {
    let (config, _site) = site_config().await;
    let server = test_server(config);

    let response = server.get("/app.js").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "console.log('ready');");

    let response = server.get("/nothing-here.css").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let (config, _site) = site_config().await;
    let server = test_server(config);

    let response = server.get("/api/categories").await;
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
    assert!(response.headers().get(header::REFERRER_POLICY).is_some());
}

#[tokio::test]
async fn cors_origin_is_configurable() {
    let (mut config, _site) = site_config().await;
    config.web.cors_origin = "https://ui.example.com".to_string();
    let server = test_server(config);

    let response = server
        .get("/api/categories")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://ui.example.com"))
        .await;
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://ui.example.com"
    );
}
