//! Single-attempt upstream fetch with browser-like headers.
//!
//! Upstream video hosts check `Referer`/`Origin` for hotlink protection and
//! often reject non-browser user agents, so every request is dressed up as a
//! page load from the referer's site. Failures are surfaced immediately.

use reqwest::{
    Client, Response,
    header::{ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT},
    redirect::Policy,
};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of redirects followed before giving up
pub const MAX_REDIRECTS: usize = 10;

/// Options for [`fetch`].
#[derive(Debug, Clone)]
pub struct FetchOptions<'a> {
    /// Sent as both `Referer` and `Origin`
    pub referer: &'a str,
    pub user_agent: &'a str,
    /// Per-request timeout. When `None`, the client's own settings apply.
    pub timeout: Option<Duration>,
}

/// Build the shared client used for all upstream traffic.
///
/// Redirects are followed transparently; callers only ever see the final response.
pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
}

/// Issue one GET to `url` with spoofed browser headers.
///
/// Any HTTP status is returned as `Ok`; only transport-level failures
/// (connect, timeout, invalid URL, too many redirects) are errors.
///
/// # Errors
///
/// Returns the [`reqwest::Error`] of the failed attempt.
pub async fn fetch(
    client: &Client,
    url: &str,
    options: &FetchOptions<'_>,
) -> Result<Response, reqwest::Error> {
    let mut request = client
        .get(url)
        .header(USER_AGENT, options.user_agent)
        .header(ACCEPT, "*/*")
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .header(REFERER, options.referer)
        .header(ORIGIN, options.referer);
    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }

    match request.send().await {
        Ok(response) => {
            debug!("Upstream {} answered {}", url, response.status());
            Ok(response)
        }
        Err(e) => {
            warn!("Upstream fetch failed for {}: {}", url, e);
            Err(e)
        }
    }
}
