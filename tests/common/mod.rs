// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use preview_server::{
    handlers,
    preview::{FetchError, FetchedPage, PageFetcher},
    state::AppState,
};

/// Build the application router around the given fetcher.
pub fn create_test_app(fetcher: Arc<dyn PageFetcher>) -> Router {
    create_app(fetcher, false)
}

/// Same as `create_test_app` with the private address guard switched on.
pub fn create_guarded_app(fetcher: Arc<dyn PageFetcher>) -> Router {
    create_app(fetcher, true)
}

fn create_app(fetcher: Arc<dyn PageFetcher>, block_private_addresses: bool) -> Router {
    let state = AppState {
        fetcher,
        block_private_addresses,
    };
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/preview", get(handlers::preview::get_preview))
        .with_state(state)
}

/// `/api/preview` URI for `target`, percent-encoded the way the UI sends it.
pub fn preview_uri(target: &str) -> String {
    format!("/api/preview?url={}", urlencoding::encode(target))
}

// ── Stub fetcher ─────────────────────────────────────────────────────────────

/// Canned `PageFetcher` that records how often it was asked to go out.
pub struct StubFetcher {
    calls: AtomicUsize,
    page: Option<FetchedPage>,
}

impl StubFetcher {
    pub fn page(content_type: &str, body: Option<&str>) -> Arc<Self> {
        Arc::new(StubFetcher {
            calls: AtomicUsize::new(0),
            page: Some(FetchedPage {
                content_type: content_type.to_string(),
                body: body.map(str::to_string),
            }),
        })
    }

    pub fn html(body: &str) -> Arc<Self> {
        Self::page("text/html; charset=utf-8", Some(body))
    }

    /// Every call fails as if the upstream timed out.
    pub fn timing_out() -> Arc<Self> {
        Arc::new(StubFetcher {
            calls: AtomicUsize::new(0),
            page: None,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn get(&self, _url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.page.clone().ok_or(FetchError::Timeout(5_000))
    }
}

// ── Upstream server ──────────────────────────────────────────────────────────

pub const ARTICLE_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <title>Local Article</title>
    <meta property="og:description" content="  An article served locally.  ">
    <meta property="og:image" content="/images/cover.png">
    <meta property="og:site_name" content="Local Site">
    <meta property="og:type" content="article">
    <link rel="icon" href="favicon.ico">
  </head>
  <body><p>Hello</p></body>
</html>"#;

async fn echo_request_headers(headers: HeaderMap) -> Html<String> {
    let value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    Html(format!(
        r#"<html><head><title>{}</title><meta name="description" content="{}"></head></html>"#,
        value(header::USER_AGENT),
        value(header::ACCEPT),
    ))
}

/// Start a throwaway upstream site on an ephemeral port and return its base URL.
pub async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/article", get(|| async { Html(ARTICLE_HTML) }))
        .route("/bare", get(|| async { Html("<html><body>nothing here</body></html>") }))
        .route("/headers", get(echo_request_headers))
        .route(
            "/avatar",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8, b'P', b'N', b'G']) }),
        )
        .route(
            "/stream",
            get(|| async { ([(header::CONTENT_TYPE, "video/mp4")], vec![0u8; 64]) }),
        )
        .route(
            "/report",
            get(|| async { ([(header::CONTENT_TYPE, "application/pdf")], "%PDF-1.4") }),
        )
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "gone").into_response() }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html("<html><head><title>Too late</title></head></html>")
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("upstream server");
    });
    format!("http://{addr}")
}

/// A base URL on which nothing is listening.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind scratch port");
    let addr = listener.local_addr().expect("scratch port addr");
    drop(listener);
    format!("http://{addr}")
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
