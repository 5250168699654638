// src/middleware/audit.rs

//! Audit recorder layer.
//!
//! Runs inside the authentication layer so the principal is already resolved. Only
//! mutating calls under `/api/` made by an authenticated user produce an entry, and
//! whatever happens while recording, the handler's response goes back untouched.

use std::net::{IpAddr, SocketAddr};

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::{
        header::{CONTENT_LENGTH, USER_AGENT},
        HeaderMap, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::AppError, config::AppState, models::auth::CurrentUser,
    services::audit_service::ObservedRequest,
};

/// Upper bound for buffering a request body before the handler sees it.
const BODY_BUFFER_LIMIT: usize = 2 * 1024 * 1024;

const API_PREFIX: &str = "/api/";

/// Commands are audited, queries are not.
pub fn should_audit(method: &Method, path: &str) -> bool {
    path.starts_with(API_PREFIX)
        && matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

/// First `X-Forwarded-For` hop when behind a proxy, the peer address otherwise.
///
/// A hop that is not an IP address is ignored, so the stored value always fits the
/// 45 characters of an IPv6 literal.
fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok())
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip()))
        .map(|ip| ip.to_string())
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

pub async fn audit_recorder(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // Nested routers strip their prefix; the audit row keeps the path the client called
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path(), |OriginalUri(uri)| uri.path())
        .to_string();

    if !should_audit(request.method(), &path) {
        return next.run(request).await;
    }

    // Anonymous calls are never logged
    let Some(user_id) = request.extensions().get::<CurrentUser>().map(CurrentUser::id) else {
        return next.run(request).await;
    };

    let (parts, body) = request.into_parts();

    // 1. Buffer the body; one over the limit is refused before the handler runs
    let body = if declared_length(&parts.headers).is_some_and(|len| len > BODY_BUFFER_LIMIT) {
        None
    } else {
        match to_bytes(body, BODY_BUFFER_LIMIT).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(method = %parts.method, %path, error = %e, "failed to capture request body");
                None
            }
        }
    };

    let observed = ObservedRequest {
        user_id,
        method: parts.method.to_string(),
        path,
        ip_address: client_ip(&parts.headers, parts.extensions.get::<ConnectInfo<SocketAddr>>()),
        user_agent: parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone().unwrap_or_default(),
    };

    // 2. Run the handler with the buffered body
    let response = match body {
        Some(bytes) => next.run(Request::from_parts(parts, Body::from(bytes))).await,
        None => AppError::PayloadTooLarge.into_response(),
    };

    // 3. Record; failures are logged inside the recorder and go no further
    app_state
        .audit_recorder
        .record(observed.into_entry(response.status().as_u16()))
        .await;

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn only_mutating_api_calls_are_audited() {
        assert!(should_audit(&Method::POST, "/api/contacts"));
        assert!(should_audit(&Method::DELETE, "/api/contacts/1"));
        assert!(should_audit(&Method::PATCH, "/api/contacts/1"));
        assert!(should_audit(&Method::PUT, "/api/contacts/1"));
        assert!(!should_audit(&Method::GET, "/api/contacts"));
        assert!(!should_audit(&Method::POST, "/api-docs/openapi.json"));
        assert!(!should_audit(&Method::POST, "/health"));
    }

    #[test]
    fn forwarded_for_wins_over_peer_address() {
        let peer = ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000)));

        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(&peer)).as_deref(), Some("10.0.0.1"));

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.2"));
        assert_eq!(client_ip(&headers, Some(&peer)).as_deref(), Some("203.0.113.7"));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn unparseable_forwarded_for_falls_back_to_peer() {
        let peer = ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000)));

        let oversized = "9".repeat(300);
        for forwarded in ["unknown", "not an ip, 10.0.0.2", oversized.as_str()] {
            let mut headers = HeaderMap::new();
            headers.insert("x-forwarded-for", HeaderValue::from_str(forwarded).unwrap());
            assert_eq!(client_ip(&headers, Some(&peer)).as_deref(), Some("10.0.0.1"), "{forwarded}");
        }

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 2001:db8::1 "));
        assert_eq!(client_ip(&headers, None).as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn declared_length_reads_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("3145728"));
        assert!(declared_length(&headers).is_some_and(|len| len > BODY_BUFFER_LIMIT));
    }
}
