//! Integration test harness for the shop backend.
//!
//! Each [`TestApp`] owns a private in-memory database and a temporary upload
//! root, and drives the full router (middleware included) in-process.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use shop_server::{AppState, ServerConfig, db, routes};

const BOUNDARY: &str = "shop-test-boundary";

/// An in-process server with its own database and upload directory.
pub struct TestApp {
    router: Router,
    pool: SqlitePool,
    upload_root: PathBuf,
    // Held for its Drop; removes the upload root.
    _dir: TempDir,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub bytes: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).expect("response body is not JSON")
    }

    /// The `error` message of an error body.
    #[must_use]
    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_owned()
    }
}

impl TestApp {
    /// Start a fresh app.
    ///
    /// The upload root is a subdirectory of the temp dir so tests can place
    /// files just outside it.
    ///
    /// # Panics
    ///
    /// Panics if the database or upload directory cannot be set up.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let upload_root = dir.path().join("uploads");

        let pool = db::create_memory_pool().await.expect("open in-memory pool");
        db::run_migrations(&pool).await.expect("run migrations");

        let config = ServerConfig::new("sqlite::memory:", &upload_root);
        let state = AppState::new(config, pool.clone());
        state.images().ensure_dirs().await.expect("create upload dirs");

        Self {
            router: routes::app(state),
            pool,
            upload_root,
            _dir: dir,
        }
    }

    /// The database behind the app, for seeding rows directly.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The upload root served under `/uploads`.
    #[must_use]
    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// Map an image reference (`/uploads/...`) to its file on disk.
    #[must_use]
    pub fn image_path(&self, reference: &str) -> PathBuf {
        let relative = reference
            .strip_prefix("/uploads/")
            .unwrap_or(reference);
        self.upload_root.join(relative)
    }

    /// Send a request and buffer the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();

        TestResponse { status, bytes }
    }

    /// `GET uri`.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(empty_request(Method::GET, uri)).await
    }

    /// `DELETE uri`.
    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(empty_request(Method::DELETE, uri)).await
    }

    /// Send `body` as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send_json(&self, method: Method, uri: &str, body: &Value) -> TestResponse {
        self.send_raw_json(method, uri, body.to_string()).await
    }

    /// Send a raw string with a JSON content type (for malformed payloads).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send_raw_json(&self, method: Method, uri: &str, body: String) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("build request");
        self.send(request).await
    }

    /// Send a multipart form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send_form(&self, method: Method, uri: &str, form: MultipartForm) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(form.finish()))
            .expect("build request");
        self.send(request).await
    }
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

/// Builder for a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, contents: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
