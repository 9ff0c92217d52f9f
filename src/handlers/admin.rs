// src/handlers/admin.rs
//
// Admin-triggered sync and import endpoints. All routes here sit behind the
// admin_guard middleware; batches run synchronously inside the request and
// return partial results rather than all-or-nothing failures.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        catalog::{ImportReport, ImportRow},
        sync::BatchSyncResponse,
    },
};

// POST /api/admin/sync/remonline
#[utoipa::path(
    post,
    path = "/api/admin/sync/remonline",
    tag = "Admin",
    responses(
        (status = 200, description = "Batch summary", body = BatchSyncResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn sync_remonline_clients(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(admin = %admin.email, "manual RemOnline client sync triggered");

    let response = app_state.sync_service.sync_users_batch().await?;
    Ok((StatusCode::OK, Json(response)))
}

// POST /api/admin/sync/remonline-services
#[utoipa::path(
    post,
    path = "/api/admin/sync/remonline-services",
    tag = "Admin",
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "RemOnline API failure")
    ),
    security(("api_jwt" = []))
)]
pub async fn sync_remonline_services(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(admin = %admin.email, "manual RemOnline service catalog sync triggered");

    let report = app_state.catalog_service.sync_from_crm().await?;
    Ok((StatusCode::OK, Json(report)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportPayload {
    // Either pre-parsed rows or raw CSV text; rows win when both are sent.
    pub rows: Option<Vec<ImportRow>>,
    pub csv: Option<String>,

    #[serde(default)]
    pub create_missing: bool,
}

// POST /api/admin/bulk-import/services
#[utoipa::path(
    post,
    path = "/api/admin/bulk-import/services",
    tag = "Admin",
    request_body = BulkImportPayload,
    responses(
        (status = 200, description = "Import report with per-row errors", body = ImportReport),
        (status = 400, description = "Neither rows nor csv provided"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_import_services(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Json(payload): Json<BulkImportPayload>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(admin = %admin.email, "bulk service import triggered");

    let report = if let Some(rows) = payload.rows {
        app_state
            .catalog_service
            .import_rows(rows, payload.create_missing)
            .await
    } else if let Some(csv_text) = payload.csv {
        app_state
            .catalog_service
            .import_csv(&csv_text, payload.create_missing)
            .await
    } else {
        return Err(AppError::BadRequest(
            "Request must contain either 'rows' or 'csv'.".to_string(),
        ));
    };

    Ok((StatusCode::OK, Json(report)))
}
