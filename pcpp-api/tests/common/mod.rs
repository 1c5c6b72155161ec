//! Common test utilities for integration tests
//!
//! Every `TestContext` owns a private in-memory database with migrations
//! applied and a router built on top of it.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pcpp_api::app::{build_router, AppState};
use pcpp_api::config::Config;
use pcpp_shared::db::migrations::run_migrations;
use pcpp_shared::db::pool::{create_pool, DatabaseConfig};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const BOUNDARY: &str = "pcpp-test-boundary";

/// Status, headers and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub json: Value,
}

impl TestResponse {
    /// `name=value` of the session cookie set by this response, if any
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("pcpp_session="))
            .and_then(|v| v.split(';').next())
            .map(|v| v.to_string())
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(Config::for_testing()).await
    }

    pub async fn with_config(config: Config) -> anyhow::Result<Self> {
        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(TestContext { db, app, config })
    }

    /// Sends a request through the router and parses the JSON body
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!(
                    "Expected JSON body, got {}: {}",
                    status,
                    String::from_utf8_lossy(&body)
                )
            })
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        self.send_json("POST", uri, body, cookie).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: Value,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(multipart_body(fields, file))).unwrap())
            .await
    }

    /// Registers a user and returns the session cookie
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api?action=register",
                serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "level": "student"
                }),
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "register failed: {}", response.json);
        response.session_cookie().expect("register should set a cookie")
    }

    /// Creates a text note as the cookie's user and returns its id
    pub async fn add_text_note(&self, cookie: &str, title: &str, matiere: &str) -> i64 {
        let response = self
            .post_multipart(
                "/api?action=addNote",
                &[
                    ("title", title),
                    ("type", "note"),
                    ("matiere", matiere),
                    ("content", "Contenu"),
                ],
                None,
                Some(cookie),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "addNote failed: {}", response.json);
        response.json["id"].as_i64().unwrap()
    }
}

/// Encodes form fields and an optional `file` part as multipart/form-data
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
