//! # Request Metrics
//!
//! HTTP-level metrics recorded through the `metrics` facade. The Prometheus
//! recorder is installed at start-up and rendered by the `/metrics` handler.
//!
//! | Metric | Kind | Labels |
//! |--------|------|--------|
//! | `ptw_http_requests_total` | counter | method, path, status |
//! | `ptw_http_request_duration_seconds` | histogram | method, path |
//! | `ptw_http_errors_total` | counter | method, path, status |

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Replace UUID path segments with `{id}` to bound label cardinality.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.len() == 36 && uuid::Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else if segment.len() == 32 && segment.chars().all(|c| c.is_ascii_hexdigit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn record_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let is_error = status >= 400;
    let status = status.to_string();
    metrics::counter!(
        "ptw_http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "ptw_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
    if is_error {
        metrics::counter!(
            "ptw_http_errors_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status" => status
        )
        .increment(1);
    }
}

/// Middleware that records request count, latency, and errors.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    record_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_normalize_path_replaces_uuid_with_hyphens() {
        let path = "/v1/permits/550e8400-e29b-41d4-a716-446655440000/approve";
        assert_eq!(normalize_path(path), "/v1/permits/{id}/approve");
    }

    #[test]
    fn test_normalize_path_replaces_uuid_without_hyphens() {
        let path = "/v1/notifications/550e8400e29b41d4a716446655440000/read";
        assert_eq!(normalize_path(path), "/v1/notifications/{id}/read");
    }

    #[test]
    fn test_normalize_path_preserves_other_segments() {
        assert_eq!(normalize_path("/v1/permits/stats"), "/v1/permits/stats");
        assert_eq!(
            normalize_path("/v1/permits/number/PTW-20261019-000001"),
            "/v1/permits/number/PTW-20261019-000001"
        );
    }

    #[test]
    fn test_record_request_renders_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            record_request("GET", "/v1/permits", 200, 0.01);
            record_request("POST", "/v1/permits/{id}/approve", 409, 0.02);
        });
        let output = handle.render();
        assert!(output.contains("ptw_http_requests_total"));
        assert!(output.contains("ptw_http_request_duration_seconds"));
        assert!(output.contains("ptw_http_errors_total"));
        assert!(output.contains("status=\"409\""));
    }
}
