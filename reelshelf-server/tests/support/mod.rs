#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::Params;
use axum_test::TestServer;
use reelshelf_config::ConfigLoader;
use reelshelf_config::sources::EnvConfig;
use reelshelf_core::api::routes::v1;
use reelshelf_core::auth::AuthCrypto;
use reelshelf_core::database::SqliteDatabase;
use reelshelf_server::{AppState, create_app};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    /// Stands in for TMDB, Google Books and Open Library at once.
    pub upstream: MockServer,
    _tempdir: TempDir,
}

pub async fn spawn_app() -> Result<TestApp> {
    let tempdir = TempDir::new()?;
    let upstream = MockServer::start().await;
    let database_url =
        format!("sqlite://{}", tempdir.path().join("test.db").display());

    let config = ConfigLoader::new()
        .with_env(EnvConfig {
            dev_mode: Some(true),
            database_url: Some(database_url.clone()),
            tmdb_api_key: Some("test-key".into()),
            tmdb_base_url: Some(upstream.uri()),
            tmdb_image_base_url: Some("https://img.test".into()),
            google_books_base_url: Some(upstream.uri()),
            open_library_base_url: Some(upstream.uri()),
            open_library_covers_base_url: Some("https://covers.test".into()),
            catalog_request_timeout_secs: Some(5),
            ..EnvConfig::default()
        })
        .load()
        .context("test config")?
        .config;

    let database = SqliteDatabase::connect(&database_url).await?;
    database.migrate().await?;

    let params = Params::new(1024, 1, 1, Some(32))
        .map_err(|e| anyhow::anyhow!("argon2 params: {e}"))?;
    let crypto = AuthCrypto::with_params("test-pepper", "test-token-key", params)?;

    let state = AppState::assemble(Arc::new(config), database, crypto)?;
    let server = TestServer::new(create_app(state.clone()))?;

    Ok(TestApp {
        server,
        state,
        upstream,
        _tempdir: tempdir,
    })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Register an account and return `(user_id, token)`.
pub async fn register(server: &TestServer, name: &str) -> (i64, String) {
    let response = server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "name": name,
            "email": format!("{name}@example.com"),
            "password": "correct-horse-battery",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body = response.json::<Value>();
    let id = body["user"]["id"].as_i64().unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    (id, token)
}
