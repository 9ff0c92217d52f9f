// src/models/sync.rs
//
// Types exchanged with the RemOnline CRM: webhook payloads coming in,
// client records going both ways, and the result shapes the admin UI
// consumes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- CRM-side objects ---

// A client record as the RemOnline API returns it. Phones come as an array;
// the webhook variant below carries a single string instead.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemoteClient {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Vec<String>,
    pub address: Option<String>,
}

// Payload for creating a client on the CRM side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRemoteClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Vec<String>,
    pub address: Option<String>,
}

// Local user data pushed to the CRM by `sync_client_to_remote`.
#[derive(Debug, Clone)]
pub struct ClientSyncData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Vec<String>,
    pub address: Option<String>,
}

// --- Inbound webhooks ---

// Body of POST /api/webhook/remonline:
// {event, data: {id, name?, email?, phone?, address?}, secret}
#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookPayload {
    pub event: String,
    pub data: WebhookClientData,
    pub secret: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookClientData {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl WebhookClientData {
    // Create/update events must identify a person somehow; a payload with
    // neither email nor phone would mint anonymous accounts.
    pub fn require_contact(&self) -> Result<(), AppError> {
        let has_email = self.email.as_deref().is_some_and(|e| !e.trim().is_empty());
        let has_phone = self.phone.as_deref().is_some_and(|p| !p.trim().is_empty());
        if !has_email && !has_phone {
            return Err(AppError::WebhookValidation(
                "Payload must contain an email or a phone number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_remote_client(self) -> RemoteClient {
        RemoteClient {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone.into_iter().collect(),
            address: self.address,
        }
    }
}

// Body of POST /api/webhooks/remonline/delete-account. The employee actor
// object is required for the audit log.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteAccountPayload {
    pub id: i64,
    pub created_at: Option<String>,
    pub event_name: String,
    pub context: DeleteContext,
    pub employee: EmployeeActor,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteContext {
    pub object_id: i64,
    pub object_type: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeActor {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
}

// --- Results ---

// Outcome of pushing one local user to the CRM. Remote failures land here as
// {success:false, message}; they are never thrown past the sync boundary.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remonline_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SyncResult {
    pub fn ok(remonline_id: i64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            remonline_id: Some(remonline_id),
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            remonline_id: None,
            message: Some(message.into()),
        }
    }
}

// What `reconcile_from_remote` did with the inbound record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(Uuid),
    Updated(Uuid),
}

impl ReconcileOutcome {
    pub fn user_id(&self) -> Uuid {
        match self {
            ReconcileOutcome::Created(id) | ReconcileOutcome::Updated(id) => *id,
        }
    }
}

// Per-user entry in the batch sync summary.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSyncResult {
    pub user_id: Uuid,
    pub email: String,
    #[serde(flatten)]
    pub result: SyncResult,
}

// Response of POST /api/admin/sync/remonline.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchSyncResponse {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<UserSyncResult>,
}

// Generic webhook acknowledgment body.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}
