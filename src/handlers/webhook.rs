// src/handlers/webhook.rs
//
// Inbound push notifications from the RemOnline CRM. Payloads are parsed by
// hand from JSON so schema failures always come back as 400 with a message
// (the CRM retries on 5xx, so malformed payloads must not look transient).

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;

use crate::{
    common::error::AppError,
    config::AppState,
    models::sync::{DeleteAccountPayload, ReconcileOutcome, WebhookAck, WebhookPayload},
};

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::WebhookValidation(e.to_string()))
}

fn ack(message: &str) -> (StatusCode, Json<WebhookAck>) {
    (
        StatusCode::OK,
        Json(WebhookAck {
            success: true,
            message: message.to_string(),
        }),
    )
}

// POST /api/webhook/remonline
#[utoipa::path(
    post,
    path = "/api/webhook/remonline",
    tag = "Webhooks",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Event processed or ignored", body = WebhookAck),
        (status = 400, description = "Payload failed validation"),
        (status = 401, description = "Wrong shared secret"),
        (status = 404, description = "client_deleted for an unknown user"),
        (status = 500, description = "Downstream failure")
    )
)]
pub async fn remonline_webhook(
    State(app_state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload: WebhookPayload = parse_body(body)?;

    if payload.secret != app_state.webhook_secret {
        return Err(AppError::InvalidWebhookSecret);
    }

    match payload.event.as_str() {
        "client_created" | "client_updated" => {
            payload.data.require_contact()?;
            let remote = payload.data.into_remote_client();
            let outcome = app_state.sync_service.reconcile_from_remote(&remote).await?;
            let message = match outcome {
                ReconcileOutcome::Created(_) => "User created successfully",
                ReconcileOutcome::Updated(_) => "User updated successfully",
            };
            Ok(ack(message))
        }
        "client_deleted" => {
            app_state
                .sync_service
                .delete_by_remonline_id(payload.data.id)
                .await?;
            Ok(ack("User deleted successfully"))
        }
        // Unknown events are acknowledged so the CRM stops retrying them.
        other => {
            tracing::debug!(event = other, "ignoring unhandled webhook event");
            Ok(ack("Event ignored"))
        }
    }
}

// POST /api/webhooks/remonline/delete-account
//
// Alternate deletion event carrying the CRM employee who triggered it; the
// actor is validated and logged for audit, then the same session -> profile
// -> user deletion sequence runs.
#[utoipa::path(
    post,
    path = "/api/webhooks/remonline/delete-account",
    tag = "Webhooks",
    request_body = DeleteAccountPayload,
    responses(
        (status = 200, description = "Account deleted or event ignored", body = WebhookAck),
        (status = 400, description = "Payload failed validation"),
        (status = 404, description = "No user for the referenced client"),
        (status = 500, description = "Downstream failure")
    )
)]
pub async fn delete_account_webhook(
    State(app_state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload: DeleteAccountPayload = parse_body(body)?;

    if payload.employee.full_name.trim().is_empty() {
        return Err(AppError::WebhookValidation(
            "Employee actor is required".to_string(),
        ));
    }

    if payload.context.object_type != "client" {
        tracing::debug!(
            object_type = %payload.context.object_type,
            "ignoring delete-account event for non-client object"
        );
        return Ok(ack("Event ignored"));
    }

    tracing::info!(
        webhook_id = payload.id,
        event = %payload.event_name,
        created_at = payload.created_at.as_deref().unwrap_or("-"),
        employee_id = payload.employee.id,
        employee = %payload.employee.full_name,
        employee_email = payload.employee.email.as_deref().unwrap_or("-"),
        client_id = payload.context.object_id,
        "account deletion requested from CRM"
    );

    app_state
        .sync_service
        .delete_by_remonline_id(payload.context.object_id)
        .await?;

    Ok(ack("User deleted successfully"))
}
