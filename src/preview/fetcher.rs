//! Outbound fetch and the top-level preview flow.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, IntoUrl, Response};
use thiserror::Error;
use url::Url;

use super::classify::{file_name_from_url, is_image_url, is_video_url, ContentClass};
use super::extractor::extract;
use super::guard::{check_target, is_private_ip, AddressFilter, GuardError};
use crate::models::{PreviewRecord, PreviewType};

pub const FETCH_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; PreviewBot/1.0)";
pub const ACCEPT_MARKUP: &str = "text/html,application/xhtml+xml";

/// Redirect hops a guarded fetch follows before giving up, matching reqwest's default.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("timeout of {0}ms exceeded")]
    Timeout(u128),

    #[error("Request failed with status code {0}")]
    Status(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Blocked(#[from] GuardError),

    #[error("Maximum number of redirects ({0}) exceeded")]
    TooManyRedirects(usize),

    #[error("{0}")]
    Request(reqwest::Error),
}

/// A response as seen by the preview flow.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// Declared `Content-Type`, empty when the header is absent.
    pub content_type: String,
    /// Body text. Only read for markup responses.
    pub body: Option<String>,
}

/// One outbound GET. Implemented over reqwest in production and stubbed in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

pub struct HttpFetcher {
    client: ReqwestClient,
    timeout: Duration,
    /// Set when every hop, redirects included, must pass the address guard.
    blocked: Option<AddressFilter>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_options(timeout, false)
    }

    /// With `block_private_addresses`, redirects are followed by hand so each
    /// hop's host is resolved and checked before it is requested.
    pub fn with_options(
        timeout: Duration,
        block_private_addresses: bool,
    ) -> Result<Self, FetchError> {
        let blocked = block_private_addresses.then_some(is_private_ip as AddressFilter);
        Self::build(timeout, blocked)
    }

    fn build(timeout: Duration, blocked: Option<AddressFilter>) -> Result<Self, FetchError> {
        let redirects = match blocked {
            Some(_) => Policy::none(),
            None => Policy::default(),
        };
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(redirects)
            .build()
            .map_err(FetchError::Request)?;
        Ok(HttpFetcher {
            client,
            timeout,
            blocked,
        })
    }

    fn classify_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout.as_millis())
        } else {
            FetchError::Request(e)
        }
    }

    async fn send<U: IntoUrl>(&self, url: U) -> Result<Response, FetchError> {
        self.client
            .get(url)
            .header(ACCEPT, ACCEPT_MARKUP)
            .send()
            .await
            .map_err(|e| self.classify_error(e))
    }

    async fn send_guarded(
        &self,
        url: &str,
        is_blocked: AddressFilter,
    ) -> Result<Response, FetchError> {
        let mut target = Url::parse(url)?;

        for _ in 0..=MAX_REDIRECTS {
            check_target(&target, is_blocked).await?;
            let response = self.send(target.clone()).await?;

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            match location {
                Some(next) if response.status().is_redirection() => {
                    tracing::debug!(from = %target, to = %next, "Following redirect");
                    target = target.join(&next)?;
                }
                _ => return Ok(response),
            }
        }

        Err(FetchError::TooManyRedirects(MAX_REDIRECTS))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = match self.blocked {
            Some(is_blocked) => self.send_guarded(url, is_blocked).await?,
            None => self.send(url).await?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = match ContentClass::from_content_type(&content_type) {
            ContentClass::Markup => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| self.classify_error(e))?;
                Some(text)
            }
            _ => None,
        };

        Ok(FetchedPage { content_type, body })
    }
}

fn image_record(url: &str, content_type: &str) -> PreviewRecord {
    PreviewRecord {
        title: Some(file_name_from_url(url)),
        image: Some(url.to_string()),
        content_type: Some(content_type.to_string()),
        ..PreviewRecord::new(url, PreviewType::Image)
    }
}

fn titled_record(url: &str, kind: PreviewType, content_type: &str) -> PreviewRecord {
    PreviewRecord {
        title: Some(file_name_from_url(url)),
        content_type: Some(content_type.to_string()),
        ..PreviewRecord::new(url, kind)
    }
}

/// Produce a preview for `url`.
///
/// URLs whose path ends in a known image or video extension are answered
/// without touching the network. Everything else costs exactly one GET through
/// `fetcher`; a failed GET becomes an error record rather than an `Err`.
pub async fn fetch_preview(fetcher: &dyn PageFetcher, url: &str) -> PreviewRecord {
    if is_image_url(url) {
        return image_record(url, "image/*");
    }
    if is_video_url(url) {
        return titled_record(url, PreviewType::Video, "video/*");
    }

    let page = match fetcher.get(url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "Failed to fetch URL for preview");
            return PreviewRecord::failure(url, format!("Failed to fetch URL: {e}"));
        }
    };

    match ContentClass::from_content_type(&page.content_type) {
        ContentClass::Image => image_record(url, &page.content_type),
        ContentClass::Video => titled_record(url, PreviewType::Video, &page.content_type),
        ContentClass::Markup => extract(url, page.body.as_deref().unwrap_or_default()),
        ContentClass::Other => titled_record(url, PreviewType::Unknown, &page.content_type),
    }
}
