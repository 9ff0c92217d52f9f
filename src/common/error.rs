use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Application-wide error type. Every handler returns this; `IntoResponse`
// below is the single place where errors become HTTP bodies.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    // Webhook payloads are validated by hand (the CRM sends loosely-typed
    // JSON), so schema failures carry a plain message.
    #[error("Invalid webhook payload: {0}")]
    WebhookValidation(String),

    #[error("Invalid webhook secret")]
    InvalidWebhookSecret,

    #[error("{0}")]
    BadRequest(String),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Admin access required")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("RemOnline API error: {0}")]
    Remonline(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Return every field-level detail from the validator.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::WebhookValidation(msg) => {
                let body = Json(json!({ "success": false, "message": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            // The webhook delete path contract: 404 + {success:false, message}.
            AppError::UserNotFound => {
                let body = Json(json!({ "success": false, "message": "User not found" }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::BadRequest(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidWebhookSecret => (StatusCode::UNAUTHORIZED, "Invalid webhook secret."),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "This email is already in use."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password."),
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Missing or invalid authentication token.")
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Admin access required."),

            // Everything else (database, RemOnline, bcrypt, jwt, anyhow)
            // becomes a generic 500; tracing keeps the detailed message.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
