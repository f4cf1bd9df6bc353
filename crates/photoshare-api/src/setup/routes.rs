//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{
    HEALTH_PATH, MAX_REQUEST_BODY_BYTES, OPENAPI_PATH, THUMBNAILS_PATH, UPLOAD_URL_PATH,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use photoshare_core::Config;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Headers browsers may send on cross-origin calls, matching API Gateway's defaults
const CORS_ALLOWED_HEADERS: [HeaderName; 5] = [
    header::CONTENT_TYPE,
    HeaderName::from_static("x-amz-date"),
    header::AUTHORIZATION,
    HeaderName::from_static("x-api-key"),
    HeaderName::from_static("x-amz-security-token"),
];

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let upload_routes = Router::new()
        .route(
            UPLOAD_URL_PATH,
            post(handlers::upload_url::create_upload_url),
        )
        .layer(setup_cors(config, [Method::OPTIONS, Method::POST])?);

    let thumbnail_routes = Router::new()
        .route(THUMBNAILS_PATH, get(handlers::thumbnails::get_thumbnails))
        .layer(setup_cors(config, [Method::OPTIONS, Method::GET])?);

    let app = Router::new()
        .merge(upload_routes)
        .merge(thumbnail_routes)
        .route(HEALTH_PATH, get(handlers::health::health_check))
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS for one route group
fn setup_cors(config: &Config, methods: [Method; 2]) -> Result<CorsLayer, anyhow::Error> {
    let origin = if config.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(CORS_ALLOWED_HEADERS))
}
