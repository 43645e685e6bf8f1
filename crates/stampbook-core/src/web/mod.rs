//! JSON HTTP API for business terminals.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/api/health` | Liveness |
//! | GET | `/api/customers/{id}/code` | A customer's code, deep link and optional QR |
//! | POST | `/api/resolve` | Code to customer identifier |
//! | POST | `/api/verify` | Code to enrolled customer at a business |

pub mod error;
pub mod handlers;
pub mod state;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, SharedState};

use crate::config::WebConfig;
use crate::error::Result;

/// Request bodies are tiny JSON objects.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Build the router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/customers/{id}/code", get(handlers::get_customer_code))
        .route("/api/resolve", post(handlers::resolve))
        .route("/api/verify", post(handlers::verify))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(cors),
        )
        .with_state(Arc::new(state))
}

/// Address to bind for `config`.
#[must_use]
pub fn bind_address(config: &WebConfig) -> SocketAddr {
    let ip = if config.localhost_only {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    } else {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    };
    SocketAddr::new(ip, config.port)
}

/// Serve the API until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, config: &WebConfig) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_address(config)).await?;
    info!(addr = %listener.local_addr()?, "web API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down web API");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Enrollment, MemoryDirectory};
    use crate::verify::EnrollmentVerifier;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const JANE: &str = "11111111-1111-1111-1111-111111111111";

    fn app() -> Router {
        let directory = Arc::new(
            MemoryDirectory::new()
                .with_customer(JANE, Some("Jane Doe"))
                .with_customer("customer-1", None)
                .with_enrollment(Enrollment::new(JANE, "biz-other").with_points(40)),
        );
        router(AppState::new(EnrollmentVerifier::new(
            directory.clone(),
            directory,
        )))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_customer_code() {
        let request = Request::builder()
            .uri(format!("/api/customers/{JANE}/code?qr=true"))
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], "SUN-873-VPV");
        assert_eq!(json["deep_link"], "stampbook://customer/SUN-873-VPV");
        assert!(json["qr_svg"].as_str().unwrap().contains("</svg>"));
    }

    #[tokio::test]
    async fn test_customer_code_unknown_customer() {
        let request = Request::builder()
            .uri("/api/customers/nobody/code")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resolve() {
        let (status, json) = send(post_json(
            "/api/resolve",
            &serde_json::json!({ "code": "sun873vpv" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "found");
        assert_eq!(json["customer_id"], JANE);

        let (_, json) = send(post_json(
            "/api/resolve",
            &serde_json::json!({ "code": "ZZZ-999-ZZZ" }),
        ))
        .await;
        assert_eq!(json["status"], "not_found");
    }

    #[tokio::test]
    async fn test_verify_found() {
        let (status, json) = send(post_json(
            "/api/verify",
            &serde_json::json!({ "code": "SUN-873-VPV", "business_id": "biz-other" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["display_name"], "Jane Doe");
        assert_eq!(json["points"], 40);
    }

    #[tokio::test]
    async fn test_verify_error_statuses() {
        let cases = [
            ("SUN-873-VPV", "biz-42", StatusCode::FORBIDDEN, "E003"),
            ("ZZZ-999-ZZZ", "biz-42", StatusCode::NOT_FOUND, "E002"),
            ("12", "biz-42", StatusCode::BAD_REQUEST, "E001"),
        ];
        for (code, business_id, expected, error_code) in cases {
            let (status, json) = send(post_json(
                "/api/verify",
                &serde_json::json!({ "code": code, "business_id": business_id }),
            ))
            .await;
            assert_eq!(status, expected, "{code}");
            assert_eq!(json["code"], error_code);
            assert!(json["details"].is_string());
        }
    }

    #[tokio::test]
    async fn test_verify_requires_business() {
        let (status, _) = send(post_json(
            "/api/verify",
            &serde_json::json!({ "code": "SUN-873-VPV", "business_id": " " }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bind_address() {
        let mut config = WebConfig::default();
        assert!(bind_address(&config).ip().is_loopback());
        config.localhost_only = false;
        assert!(bind_address(&config).ip().is_unspecified());
    }
}
