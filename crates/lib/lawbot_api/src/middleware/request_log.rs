//! Request logging — method, path, status, and duration for every request.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Requests slower than this are logged at `warn`.
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(2);

/// Response header carrying the handler duration, e.g. `0.012s`.
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// Axum middleware: logs each request and stamps `X-Response-Time`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = client_ip(request.headers(), remote).unwrap_or_else(|| "unknown".into());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();

    let mut response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    info!(
        %method,
        %path,
        status,
        duration_ms = elapsed.as_millis() as u64,
        %client_ip,
        %user_agent,
        "request completed"
    );
    if elapsed > SLOW_REQUEST_THRESHOLD {
        warn!(%method, %path, %client_ip, "slow request: took {:.3}s", elapsed.as_secs_f64());
    }

    if let Ok(value) = HeaderValue::from_str(&format!("{:.3}s", elapsed.as_secs_f64())) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }
    response
}

/// First `X-Forwarded-For` entry, else the peer address.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_owned)
        .or_else(|| remote.map(|addr| addr.ip().to_string()))
}
