// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer, http::HeaderValue, http::StatusCode, routing::get,
    routing::post, BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod handlers;
pub mod responses;

use crate::core::traits::{MemberStore, Notifier};
use crate::engine::VerificationEngine;

// Re-export Config from config module
pub use crate::config::Config;

/// Application state containing all shared dependencies
///
/// All components are constructed once at startup and shared behind Arc
/// across async tasks; nothing global, nothing lazily reconnected.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VerificationEngine>,
    pub store: Arc<dyn MemberStore>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - CORS (tower-http::cors) - single permitted origin, credentials allowed
/// - Request tracing (tower-http::trace)
/// - Body size limit (tower-http::limit)
/// - Request timeout (tower::timeout)
///
/// Note: Panic recovery is handled automatically by Tower.
pub fn create_router(app_state: &AppState) -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/request_otp", post(handlers::request_otp_handler))
        .route("/register_user", post(handlers::register_user_handler))
        .route("/verify/:magic_link", get(handlers::verify_link_handler))
        .route("/send_email", post(handlers::send_email_handler));

    // CORS: exactly one origin; methods and headers mirror the request, which
    // is the permissive-but-credentialed combination CorsLayer allows.
    match app_state.config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods(AllowMethods::mirror_request())
                    .allow_headers(AllowHeaders::mirror_request())
                    .allow_credentials(true),
            );
        }
        Err(e) => {
            warn!(error = %e, origin = %app_state.config.allowed_origin, "Invalid CORS origin, CORS layer disabled");
        }
    }

    let body_limit = app_state.config.body_size_limit_bytes;
    let timeout_secs = app_state.config.request_timeout_secs;

    router = router
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(body_limit));

    // HandleErrorLayer must come BEFORE timeout to catch the timeout error
    let middleware_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string())
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    router.layer(middleware_stack)
}
