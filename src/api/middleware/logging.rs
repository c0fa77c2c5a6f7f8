//! Request/response logging middleware with header redaction

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{info, warn};

use super::matched_path;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log each request and its outcome.
///
/// Runs inside `TraceLayer`'s span and must not open another span.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = matched_path(&request);
    let request_id = request_id(&request);

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %redact_headers(&request),
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            request_id = %request_id,
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            request_id = %request_id,
            "Request completed"
        );
    }

    response
}

fn request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "-".to_string())
}

/// Loggable headers as `name=value`, secrets replaced
fn redact_headers(request: &Request<Body>) -> String {
    request
        .headers()
        .iter()
        .filter(|(name, _)| should_log_header(name.as_str()))
        .map(|(name, value)| {
            let value = if is_sensitive_header(name.as_str()) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            format!("{}={}", name.as_str(), value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization"
            | "proxy-authorization"
            | "cookie"
            | "set-cookie"
            | "x-api-key"
            | "api-key"
            | "x-goog-api-key"
    )
}

fn should_log_header(name: &str) -> bool {
    is_sensitive_header(name)
        || matches!(
            name,
            "content-type"
                | "content-length"
                | "accept"
                | "user-agent"
                | "x-request-id"
                | "x-forwarded-for"
                | "x-real-ip"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/ask");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_is_sensitive_header() {
        assert!(is_sensitive_header("authorization"));
        assert!(is_sensitive_header("x-goog-api-key"));
        assert!(is_sensitive_header("api-key"));
        assert!(!is_sensitive_header("content-type"));
    }

    #[test]
    fn test_redact_headers_hides_secrets() {
        let request = request_with(&[
            ("content-type", "application/json"),
            ("authorization", "Bearer secret-token"),
            ("etag", "abc"),
        ]);

        let logged = redact_headers(&request);

        assert!(logged.contains("content-type=application/json"));
        assert!(logged.contains("authorization=[REDACTED]"));
        assert!(!logged.contains("secret-token"));
        assert!(!logged.contains("etag"));
    }

    #[test]
    fn test_request_id_falls_back_to_dash() {
        assert_eq!(request_id(&request_with(&[])), "-");
        assert_eq!(
            request_id(&request_with(&[("x-request-id", "abc-123")])),
            "abc-123"
        );
    }
}
