//! Access log middleware.
//!
//! Resolves the request id, runs the rest of the stack inside a `request`
//! span carrying it, echoes it back and logs one line per request.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderName, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::Instrument;

use super::request_id::{REQUEST_ID_HEADER, RequestId};

pub async fn access_log(mut request: Request<Body>, next: Next) -> Response {
    let request_id = RequestId::ensure(&mut request);

    let started_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let start = Instant::now();
    // Absent when the router is driven without a TCP listener (tests).
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span.clone()).await;

    if let Some(value) = request_id.header_value() {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    span.in_scope(|| {
        tracing::info!(
            remote_addr = %remote_addr,
            started_at = %started_at,
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "{} {} {}",
            method,
            path,
            response.status()
        );
    });

    response
}
