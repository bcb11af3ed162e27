//! Inbound request normalization.
//!
//! Turns the raw method, query string and headers of a relay request into a
//! [`ProxyRequest`], rejecting malformed input before anything touches the
//! network.

use crate::{
    config::Config,
    error::{RelayError, Result},
};
use axum::http::{HeaderMap, Method, header::HOST};
use std::borrow::Cow;

/// Scheme assumed for the caller when no `X-Forwarded-Proto` is present
const DEFAULT_FORWARDED_PROTO: &str = "https";

/// A validated relay request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    /// Absolute http(s) URL to fetch
    pub target_url: String,
    /// Sent upstream as `Referer` and `Origin`
    pub referer: String,
    /// Caller-facing relay URL used when rewriting playlist entries
    pub relay_base: String,
}

/// What the handler should do with an inbound request
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    /// CORS preflight, answered without touching the upstream
    Preflight,
    Fetch(ProxyRequest),
}

/// Validate an inbound request.
///
/// # Errors
///
/// - [`RelayError::MethodNotAllowed`] for anything but GET and OPTIONS
/// - [`RelayError::MissingParameter`] when `url` is absent or empty
/// - [`RelayError::InvalidEncoding`] when `url` is not valid percent-encoded UTF-8
/// - [`RelayError::InvalidUrlFormat`] when the decoded `url` is not http(s)
pub fn normalize(
    method: &Method,
    query: Option<&str>,
    headers: &HeaderMap,
    config: &Config,
) -> Result<Inbound> {
    if *method == Method::OPTIONS {
        return Ok(Inbound::Preflight);
    }
    if *method != Method::GET {
        return Err(RelayError::MethodNotAllowed);
    }

    let query = query.unwrap_or_default();

    let raw_url = query_param(query, "url")
        .filter(|v| !v.is_empty())
        .ok_or(RelayError::MissingParameter)?;
    let target_url = decode_strict(raw_url)?;
    if !target_url.starts_with("http://") && !target_url.starts_with("https://") {
        return Err(RelayError::InvalidUrlFormat);
    }

    let referer = query_param(query, "referer")
        .filter(|v| !v.is_empty())
        .map(|raw| {
            String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
        })
        .unwrap_or_else(|| config.default_referer.clone());

    Ok(Inbound::Fetch(ProxyRequest {
        target_url,
        referer,
        relay_base: relay_base(config, headers),
    }))
}

/// Externally visible relay URL for this request.
///
/// A configured `PUBLIC_BASE_URL` always wins. Otherwise the URL is rebuilt
/// from `X-Forwarded-Proto` and `X-Forwarded-Host`/`Host`. Without any host
/// header only the route path is returned, which players resolve against the
/// relay origin they fetched the playlist from.
pub fn relay_base(config: &Config, headers: &HeaderMap) -> String {
    if let Some(base) = &config.public_base_url {
        return base.clone();
    }

    let host = first_header_value(headers, "x-forwarded-host")
        .or_else(|| first_header_value(headers, HOST.as_str()));

    match host {
        Some(host) => {
            let proto = first_header_value(headers, "x-forwarded-proto")
                .unwrap_or(DEFAULT_FORWARDED_PROTO);
            format!("{}://{}{}", proto, host, config.proxy_path)
        }
        None => config.proxy_path.clone(),
    }
}

/// First comma-separated value of a header, trimmed
fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Raw (still percent-encoded) value of the first `name` parameter.
///
/// Keys are compared after percent-decoding, so `u%72l` matches `url`.
fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| urlencoding::decode(key).is_ok_and(|key| key == name))
        .map(|(_, value)| value)
}

/// Percent-decode once, rejecting malformed escapes and non-UTF-8 results.
///
/// `+` is kept literally; URLs routinely contain it.
fn decode_strict(raw: &str) -> Result<String> {
    let well_formed = raw.match_indices('%').all(|(i, _)| {
        raw.get(i + 1..i + 3)
            .is_some_and(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
    });
    if !well_formed {
        return Err(RelayError::InvalidEncoding);
    }

    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|_| RelayError::InvalidEncoding)
}
