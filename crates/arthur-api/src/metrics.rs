//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "arthur_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "arthur_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "arthur_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "arthur_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (collapse job ids into a placeholder).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"/generations/[a-zA-Z0-9_-]+",
    )
    .unwrap()
    .replace_all(path, "/generations/:job_id");
    let path = regex_lite::Regex::new(r"/webhooks/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/webhooks/:provider");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/generations/abc-123/wait"),
            "/api/generations/:job_id/wait"
        );
        assert_eq!(
            sanitize_path("/api/webhooks/luma"),
            "/api/webhooks/:provider"
        );
        assert_eq!(sanitize_path("/health"), "/health");
    }
}
