#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use learnings_api::config::AppConfig;
use learnings_api::database::MemoryStore;
use learnings_api::{app, AppState};

pub const TEST_HOST: &str = "journal.test:8080";
pub const PASSWORD: &str = "secret1";

/// The full router over an in-memory store and a throwaway upload directory.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    pub uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body)
            .with_context(|| format!("body is not JSON: {:?}", String::from_utf8_lossy(&self.body)))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_config(|_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let uploads = tempfile::tempdir()?;

        let mut config = AppConfig::development();
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.uploads.dir = uploads.path().to_path_buf();
        customize(&mut config);

        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        let router = app(state.clone());
        Ok(Self { state, router, uploads })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        let request = builder(Method::GET, path, token).body(Body::empty())?;
        self.send(request).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        let request = builder(Method::DELETE, path, token).body(Body::empty())?;
        self.send(request).await
    }

    pub async fn send_json(&self, method: Method, path: &str, body: Value, token: Option<&str>) -> Result<TestResponse> {
        let request = builder(method, path, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?;
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> Result<TestResponse> {
        self.send_json(Method::POST, path, body, token).await
    }

    pub async fn post_multipart(&self, path: &str, parts: &[Part<'_>], token: Option<&str>) -> Result<TestResponse> {
        let (content_type, body) = multipart_body(parts);
        self.post_raw(path, &content_type, body, token).await
    }

    pub async fn post_raw(&self, path: &str, content_type: &str, body: Vec<u8>, token: Option<&str>) -> Result<TestResponse> {
        let request = builder(Method::POST, path, token)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))?;
        self.send(request).await
    }

    /// Names of the files currently in the upload directory.
    pub fn stored_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.uploads.path())? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    pub async fn register(&self, username: &str, email: &str) -> Result<TestResponse> {
        self.post_json(
            "/auth/register",
            json!({ "username": username, "email": email, "password": PASSWORD }),
            None,
        )
        .await
    }

    /// Register `username` and return a bearer token for it.
    pub async fn login_as(&self, username: &str) -> Result<String> {
        let registered = self.register(username, &format!("{}@example.com", username)).await?;
        anyhow::ensure!(registered.status == StatusCode::CREATED, "register failed: {}", registered.text());

        let login = self
            .post_json("/auth/login", json!({ "username": username, "password": PASSWORD }), None)
            .await?;
        anyhow::ensure!(login.status == StatusCode::OK, "login failed: {}", login.text());

        login.json()?["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }
}

fn builder(method: Method, path: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(path).header(header::HOST, TEST_HOST);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
}

/// One multipart field: name, optional filename, contents.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn file<'a>(name: &'a str, filename: &'a str, data: &'a [u8]) -> Part<'a> {
    Part { name, filename: Some(filename), data }
}

const BOUNDARY: &str = "learnings-test-boundary";

pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
