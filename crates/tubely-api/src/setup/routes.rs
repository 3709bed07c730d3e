//! Route configuration and setup

use crate::auth::{auth_middleware, AuthState};
use crate::error::HttpAppError;
use crate::handlers;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tubely_core::constants::MAX_UPLOAD_SIZE_BYTES;
use tubely_core::{AppError, Config};

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState::new(&config.jwt_secret));

    let protected = protected_routes().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    let app = public_routes()
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/media/{bucket}/{*key}",
            get(handlers::media_file::serve_media),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    let upload = Router::new().route(
        "/api/video_upload/{video_id}",
        post(handlers::video_upload::upload_video),
    );

    Router::new()
        .merge(with_upload_limit(upload, MAX_UPLOAD_SIZE_BYTES as usize))
        .route("/api/videos/{video_id}", get(handlers::video_get::get_video))
}

/// Replace axum's default 2 MB cap with `limit` for every route in `router`.
///
/// Rejections come back as the usual JSON error body, including the early 413 the limit
/// layer sends for an oversized `Content-Length`.
fn with_upload_limit<S>(router: Router<S>, limit: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(axum::middleware::map_response(payload_too_large_as_json))
}

async fn payload_too_large_as_json(response: Response<Body>) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return HttpAppError(AppError::PayloadTooLarge(
            "Upload exceeds the maximum allowed size".to_string(),
        ))
        .into_response();
    }
    response.map(Body::new)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum_test::TestServer;

    fn limited_echo(limit: usize) -> TestServer {
        let router = Router::new().route(
            "/echo",
            post(|body: Bytes| async move { body.len().to_string() }),
        );
        TestServer::new(with_upload_limit(router, limit).into_make_service()).unwrap()
    }

    #[tokio::test]
    async fn test_oversized_content_length_gets_json_error() {
        let server = limited_echo(8);

        let response = server
            .post("/echo")
            .bytes(Bytes::from_static(b"well over eight bytes"))
            .await;

        assert_eq!(response.status_code(), 413);
        assert_eq!(response.header("content-type"), "application/json");
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(body["recoverable"], false);
    }

    #[tokio::test]
    async fn test_body_within_limit_passes_through() {
        let server = limited_echo(8);

        let response = server.post("/echo").bytes(Bytes::from_static(b"tiny")).await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text(), "4");
    }
}
