use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, AppResult};
use crate::models::PreviewRecord;
use crate::preview::classify::is_media_url;
use crate::preview::guard::{self, GuardError};
use crate::preview::fetch_preview;
use crate::state::AppState;

// ── Query params ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub url: Option<String>,
}

// ── Handler ────────────────────────────────────────────────────────────────

/// GET /api/preview?url=<encoded-url>
///
/// Returns 200 with the preview record, 500 with an error record when the
/// outbound fetch fails, and 400 when `url` is missing, malformed, or (with
/// the address guard on) points somewhere it may not go.
pub async fn get_preview(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> AppResult<(StatusCode, Json<PreviewRecord>)> {
    let Query(params) = query.map_err(|rejection| {
        AppError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    })?;

    // The record echoes the parameter as given; trimming is only for the blank check.
    let target = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("URL parameter is required".into()))?;

    let parsed = Url::parse(&target).map_err(|_| AppError::Validation("Invalid URL".into()))?;

    if state.block_private_addresses {
        screen_target(&target, &parsed).await?;
    }

    tracing::info!(url = %target, "Fetching preview");
    let record = fetch_preview(state.fetcher.as_ref(), &target).await;

    let status = if record.is_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        tracing::debug!(url = %target, kind = ?record.kind, "Preview ready");
        StatusCode::OK
    };

    Ok((status, Json(record)))
}

/// Reject blocked schemes and internal hosts up front.
///
/// Media URLs are answered without any network traffic, so they only get the
/// scheme check. Hosts that do not resolve are left to the fetch, which reports
/// them as an ordinary fetch failure.
async fn screen_target(target: &str, parsed: &Url) -> AppResult<()> {
    guard::ensure_http_scheme(parsed).map_err(|e| AppError::Validation(e.to_string()))?;

    if is_media_url(target) {
        return Ok(());
    }

    match guard::ensure_public_target(parsed).await {
        Ok(()) | Err(GuardError::Unresolvable(_)) => Ok(()),
        Err(e) => Err(AppError::Validation(e.to_string())),
    }
}
