//! HTTP Middleware
//!
//! 请求耗时与 HTTP 状态码日志

use std::time::{Duration, Instant};

use axum::{extract::Request, middleware::Next, response::Response};

/// 超过该耗时的请求记为慢请求（批量抓取通常会触发）
const SLOW_REQUEST: Duration = Duration::from_secs(10);

/// 请求日志中间件
///
/// 4xx/5xx 按级别记录；业务错误（errno != 0）由 ApiError::into_response() 记录。
/// SSE 请求的耗时只覆盖到响应头发出为止。
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    } else if started.elapsed() >= SLOW_REQUEST {
        tracing::info!(method = %method, uri = %uri, elapsed_ms, "Slow request");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::{get, post},
        Router,
    };
    use tower::util::ServiceExt;

    fn create_test_router() -> Router {
        Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .route("/api/work/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/api/scrape/broken",
                post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .layer(axum::middleware::from_fn(request_logging_middleware))
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        create_test_router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_passes_responses_through() {
        assert_eq!(status_of("GET", "/api/ping").await, StatusCode::OK);
        assert_eq!(status_of("GET", "/api/work/missing").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_of("POST", "/api/scrape/broken").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_client_error() {
        assert_eq!(status_of("GET", "/api/unknown").await, StatusCode::NOT_FOUND);
    }
}
