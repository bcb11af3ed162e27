//! Upstream relay: fetch, classify, rewrite, and project the upstream
//! response onto the outbound one.

use crate::{
    content::{Classification, ContentKind, DEFAULT_CONTENT_TYPE},
    error::{RelayError, Result},
    hls::rewrite_playlist,
    metrics,
    server::request::ProxyRequest,
    upstream::{self, FetchOptions},
};
use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// How much of a failed upstream body ends up in the logs
const ERROR_BODY_LOG_CHARS: usize = 200;

/// Per-process settings the relay needs for every request
#[derive(Debug, Clone)]
pub struct RelaySettings<'a> {
    pub user_agent: &'a str,
    pub timeout: Option<Duration>,
}

/// Fetch `request.target_url` once and build the outbound response.
///
/// Playlists are read as text and rewritten so every entry loops back through
/// the relay; anything else is buffered and returned byte-for-byte.
///
/// # Errors
///
/// - [`RelayError::FetchError`] when the upstream cannot be reached or its body cannot be read
/// - [`RelayError::UpstreamFailure`] when the upstream answers with a non-2xx status
/// - [`RelayError::InternalError`] when the target URL cannot serve as a rewrite base
pub async fn relay(
    client: &Client,
    request: &ProxyRequest,
    settings: &RelaySettings<'_>,
) -> Result<Response> {
    info!("Fetching upstream: {}", request.target_url);
    debug!("Referer: {}", request.referer);

    let options = FetchOptions {
        referer: &request.referer,
        user_agent: settings.user_agent,
        timeout: settings.timeout,
    };
    let response = upstream::fetch(client, &request.target_url, &options)
        .await
        .inspect_err(|_| metrics::record_upstream_error())?;

    let status = response.status();
    info!("Upstream status: {}", status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let excerpt: String = body.chars().take(ERROR_BODY_LOG_CHARS).collect();
        error!("Upstream error {}: {}", status, excerpt);

        return Err(RelayError::UpstreamFailure {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    let upstream_headers = response.headers();
    let content_type = upstream_headers.get(CONTENT_TYPE).cloned();
    let classification = Classification::classify(
        content_type.as_ref().and_then(|v| v.to_str().ok()),
        &request.target_url,
    );
    let kind = classification.kind();
    debug!("Classified {} as {:?}", request.target_url, classification);

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        content_type.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(classification.cache_control()));
    if let Some(range) = upstream_headers.get(CONTENT_RANGE) {
        headers.insert(CONTENT_RANGE, range.clone());
    }
    if let Some(accept_ranges) = upstream_headers.get(ACCEPT_RANGES) {
        headers.insert(ACCEPT_RANGES, accept_ranges.clone());
    }
    let content_length = upstream_headers.get(CONTENT_LENGTH).cloned();

    if kind == ContentKind::Playlist {
        let text = response.text().await?;
        let base = Url::parse(&request.target_url).map_err(|e| {
            RelayError::InternalError(format!(
                "Cannot use {} as playlist base: {}",
                request.target_url, e
            ))
        })?;

        let rewritten = rewrite_playlist(&text, &base, &request.relay_base, &request.referer);
        metrics::record_playlist_rewrite();
        info!(
            "Rewrote playlist {} ({} -> {} bytes)",
            request.target_url,
            text.len(),
            rewritten.len()
        );

        // Upstream length describes the original body, never the rewritten one
        headers.insert(CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
        return Ok((StatusCode::OK, headers, rewritten).into_response());
    }

    let bytes = response.bytes().await?;

    // The body is fully buffered, so only forward a length that matches it
    if let Some(length) = content_length {
        if length.to_str().ok().and_then(|v| v.parse::<usize>().ok()) == Some(bytes.len()) {
            headers.insert(CONTENT_LENGTH, length);
        } else {
            warn!(
                "Upstream Content-Length {:?} does not match {} buffered bytes",
                length,
                bytes.len()
            );
        }
    }

    Ok((StatusCode::OK, headers, Body::from(bytes)).into_response())
}
