// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub series_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// One row of a bulk import, as it arrives from a CSV file or the CRM
// service-catalog export. All numeric fields stay strings here; the importer
// parses them permissively.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportRow {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub warranty: String,
    #[serde(default)]
    pub duration: String,
}

// Whether the price-link upsert inserted or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// How many row error messages the import report carries back to the caller.
pub const MAX_REPORTED_ERRORS: usize = 10;

// Summary returned by the bulk import endpoints. Partial results by design:
// the operator sees progress even when some rows fail.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success: bool,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub error_messages: Vec<String>,
}

impl ImportReport {
    pub fn record_error(&mut self, message: String) {
        self.errors += 1;
        if self.error_messages.len() < MAX_REPORTED_ERRORS {
            self.error_messages.push(message);
        }
    }
}
