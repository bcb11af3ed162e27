use crate::{
    error::Result,
    metrics,
    relay::{self, RelaySettings},
    server::{
        request::{self, Inbound},
        state::AppState,
    },
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::warn;

/// Relay entry point, mounted for every method on the proxy path.
///
/// OPTIONS is answered as a CORS preflight, GET is relayed, anything else is
/// rejected. Validation runs before the upstream is contacted.
pub async fn serve_proxy(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let start = Instant::now();

    let response = match handle(&method, query.as_deref(), &headers, &state).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Relay request failed: {}", e);
            e.into_response()
        }
    };

    metrics::record_request("proxy", response.status().as_u16());
    metrics::record_duration("proxy", start);

    response
}

async fn handle(
    method: &Method,
    query: Option<&str>,
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Response> {
    let request = match request::normalize(method, query, headers, &state.config)? {
        Inbound::Preflight => return Ok(StatusCode::OK.into_response()),
        Inbound::Fetch(request) => request,
    };

    let settings = RelaySettings {
        user_agent: &state.config.user_agent,
        timeout: state.config.upstream_timeout,
    };
    relay::relay(&state.http_client, &request, &settings).await
}
