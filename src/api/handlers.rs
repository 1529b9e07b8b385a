// Request handlers for API endpoints

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::api::responses::{ApiError, HealthResponse};
use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestOtpBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserBody {
    pub email: String,
    pub otp: i32,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailBody {
    pub email: String,
    pub subject: String,
    pub content: String,
}

/// Extract request ID from headers or generate UUID
fn request_id_from(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Welcome screen
///
/// GET /
pub async fn root_handler() -> Json<&'static str> {
    Json("MedipolDAO API by @yeklabs")
}

/// Issue a verification challenge for an email address
///
/// POST /request_otp
///
/// On success the OTP and magic link have been persisted and emailed.
/// Whether the OTP is also echoed in the response body is
/// configuration-driven; see `RETURN_OTP_IN_RESPONSE`.
pub async fn request_otp_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RequestOtpBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request_id = request_id_from(&headers);

    info!(email = %body.email, request_id = %request_id, "OTP requested");

    let challenge = app_state
        .engine
        .issue_challenge(&body.email)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %body.email, request_id = %request_id, "OTP request failed");
            ApiError::from(e).with_request_id(request_id.clone())
        })?;

    if app_state.config.return_otp_in_response {
        Ok(Json(json!(challenge.otp)))
    } else {
        Ok(Json(json!("OTP was sent to your email.")))
    }
}

/// Complete verification with the emailed code
///
/// POST /register_user
pub async fn register_user_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterUserBody>,
) -> Result<Json<&'static str>, ApiError> {
    let request_id = request_id_from(&headers);

    app_state
        .engine
        .consume_by_code(&body.email, body.otp)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %body.email, request_id = %request_id, "Code verification failed");
            ApiError::from(e).with_request_id(request_id.clone())
        })?;

    Ok(Json("User was registered."))
}

/// Complete verification with the emailed magic link
///
/// GET /verify/{magic_link}
pub async fn verify_link_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(magic_link): Path<String>,
) -> Result<Json<&'static str>, ApiError> {
    let request_id = request_id_from(&headers);

    app_state
        .engine
        .consume_by_link(&magic_link)
        .await
        .map_err(|e| {
            warn!(error = %e, request_id = %request_id, "Magic-link verification failed");
            ApiError::from(e).with_request_id(request_id.clone())
        })?;

    Ok(Json("User was registered."))
}

/// Send an arbitrary email through the provider
///
/// POST /send_email
pub async fn send_email_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SendEmailBody>,
) -> Result<Json<&'static str>, ApiError> {
    let request_id = request_id_from(&headers);

    app_state
        .notifier
        .send(&body.email, &body.subject, &body.content)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %body.email, request_id = %request_id, "Email dispatch failed");
            ApiError::from(e).with_request_id(request_id.clone())
        })?;

    Ok(Json("Email sent successfully."))
}

/// Health check handler
///
/// GET /health
///
/// Checks:
/// - Server is running
/// - Credential store connectivity
pub async fn health_handler(
    State(app_state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    // Keep the health endpoint fast: a slow store reports as "slow", the
    // endpoint itself still answers.
    let store_status = match tokio::time::timeout(
        std::time::Duration::from_millis(500),
        app_state.store.ping(),
    )
    .await
    {
        Ok(Ok(())) => "connected".to_string(),
        Ok(Err(e)) => {
            warn!(error = %e, "Store ping failed");
            "disconnected".to_string()
        }
        Err(_) => "slow: timeout".to_string(),
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        store: store_status,
    }))
}
