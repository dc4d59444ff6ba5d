//! Backend forwarding.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from the inbound request
//! - Rewrite the target URI and `Host` to the configured backend
//! - Relay status, filtered headers and body back to the caller
//! - Map any transport failure to a 502 with a short diagnostic
//!
//! # Design Decisions
//! - Bodies are fully buffered on both legs so `Content-Length` can be
//!   recomputed from the bytes actually relayed
//! - A failed forward is never retried and never affects another request

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode, Uri};
use axum::response::IntoResponse;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use tokio::time;

use crate::config::BackendConfig;

/// Headers meaningful only to one transport connection; never relayed in
/// either direction.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    // HeaderName::as_str is always lowercase, so this is case-insensitive.
    HOP_BY_HOP.contains(&name.as_str())
}

/// Headers forwarded to the backend: everything except the hop-by-hop set
/// and `Host`, which is replaced by the backend authority.
fn forward_headers(src: &HeaderMap, host: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(src.len() + 1);
    for (name, value) in src.iter() {
        if is_hop_by_hop(name) || name == header::HOST {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(header::HOST, host.clone());
    headers
}

/// Headers relayed to the caller: everything except the hop-by-hop set and
/// `Content-Length`, which is recomputed from the relayed body.
fn relay_headers(src: &HeaderMap, body_len: usize) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(src.len() + 1);
    for (name, value) in src.iter() {
        if is_hop_by_hop(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len as u64));
    headers
}

/// Relays requests to the single configured backend.
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    host_header: HeaderValue,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(backend: &BackendConfig) -> Result<Self, axum::http::Error> {
        let authority: Authority = backend.authority().parse::<Authority>()?;
        let host_header = HeaderValue::from_str(authority.as_str())?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            authority,
            host_header,
            timeout: Duration::from_secs(backend.timeout_secs),
        })
    }

    /// Forward one request and produce the response for the original caller.
    ///
    /// Infallible by contract: every failure mode becomes an HTTP response,
    /// so a broken backend can never take a connection task down.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        let (parts, body) = request.into_parts();

        let inbound_body = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read inbound request body");
                return (StatusCode::BAD_REQUEST, "Invalid request body\n").into_response();
            }
        };

        // Re-target the URI at the backend, keeping path and query verbatim.
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        let uri = Uri::from_parts(uri_parts).unwrap_or_else(|_| parts.uri.clone());

        let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = forward_headers(&parts.headers, &self.host_header);
        }
        let outbound = match builder.body(Body::from(inbound_body)) {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(error = %e, "failed to build backend request");
                return bad_gateway(&e.to_string());
            }
        };

        let response = match time::timeout(self.timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(backend = %self.authority, error = %e, "backend request failed");
                return bad_gateway(&e.to_string());
            }
            Err(_) => {
                tracing::warn!(
                    backend = %self.authority,
                    timeout_secs = self.timeout.as_secs(),
                    "backend request timed out"
                );
                return bad_gateway("upstream timeout");
            }
        };

        let (response_parts, response_body) = response.into_parts();
        let relayed = match axum::body::to_bytes(Body::new(response_body), usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(backend = %self.authority, error = %e, "failed to read backend response body");
                return bad_gateway(&e.to_string());
            }
        };

        let mut builder = Response::builder().status(response_parts.status);
        if let Some(headers) = builder.headers_mut() {
            *headers = relay_headers(&response_parts.headers, relayed.len());
        }
        match builder.body(Body::from(relayed)) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "failed to assemble relayed response");
                bad_gateway(&e.to_string())
            }
        }
    }
}

fn bad_gateway(diagnostic: &str) -> Response<Body> {
    (
        StatusCode::BAD_GATEWAY,
        format!("Bad gateway: {}\n", diagnostic),
    )
        .into_response()
}
