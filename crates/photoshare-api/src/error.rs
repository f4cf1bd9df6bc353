//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` and use `?` on anything that
//! converts into `AppError`; status, body and logging are decided here.

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use photoshare_core::{AppError, ErrorMetadata, LogLevel};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
///
/// Needed because of the orphan rule: `IntoResponse` and `AppError` are both foreign here.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// JSON body extractor that does not insist on a `Content-Type` header.
///
/// Browser and API-gateway clients often post JSON as `text/plain`. Any body that fails to
/// parse is a 400 in our `ErrorResponse` format.
#[derive(Debug, Clone, Copy)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            HttpAppError(AppError::InvalidInput(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )))
        })?;

        let value = serde_json::from_slice(&body).map_err(|e| {
            HttpAppError(AppError::InvalidInput(format!("Invalid request body: {}", e)))
        })?;
        Ok(JsonBody(value))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details never leave the process in production or for sensitive errors.
        let show_details = !is_production_env() && !app_error.is_sensitive();
        let body = ErrorResponse {
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
            error_type: show_details.then(|| app_error.error_type().to_string()),
            details: show_details.then(|| app_error.detailed_message()),
        };

        (status, Json(body)).into_response()
    }
}
