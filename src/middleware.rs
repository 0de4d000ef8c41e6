use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AccessGuard;
use crate::handlers::AppState;
use crate::metrics::{route_key, RequestObservation};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logging middleware for request/response tracking
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = get_client_ip(&request);
    let request_id = Uuid::new_v4().to_string();

    info!(
        target: "todo_api::middleware",
        request_id = %request_id,
        method = %method,
        uri = %uri,
        client_ip = %client_ip,
        "Incoming request"
    );

    let mut response = next.run(request).await;

    let status = response.status();
    info!(
        target: "todo_api::middleware",
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Records every completed request, error responses included, against its
/// route template once the inner service has produced the response.
pub async fn record_metrics(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let matched = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned());
    let route = route_key(&method, matched.as_deref(), request.uri());
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;

    state
        .metrics
        .record_request(RequestObservation {
            method: method.to_string(),
            route_key: route,
            path,
            status: response.status().as_u16(),
            duration: started.elapsed(),
        })
        .await;

    response
}

/// Rejects create/update/delete requests that lack the configured API key.
/// Reads pass straight through.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let guarded = request
        .extensions()
        .get::<MatchedPath>()
        .is_some_and(|matched| AccessGuard::is_guarded(request.method(), matched.as_str()));

    if guarded {
        if let Err(err) = state.guard.authorize_headers(request.headers()) {
            warn!(
                target: "todo_api::middleware",
                method = %request.method(),
                uri = %request.uri(),
                reason = %err,
                "Rejected request"
            );
            return err.into_response();
        }
    }

    next.run(request).await
}

fn get_client_ip(request: &Request) -> String {
    // Try to get real IP from headers first
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return first_ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    // Fallback to connection info
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        addr.ip().to_string()
    } else {
        "unknown".to_string()
    }
}
