// src/services/catalog_service.rs
//
// Bulk import of the repair price list. Rows come from an uploaded CSV or
// straight from the RemOnline service catalog; either way each row is
// resolved brand -> series -> model -> service by exact name and the
// (model, service) price link is updated or inserted. One bad row never
// aborts the batch.

use std::sync::Arc;

use crate::common::error::AppError;
use crate::common::normalize::{parse_int_loose, parse_price};
use crate::db::CatalogStore;
use crate::models::catalog::{ImportReport, ImportRow, UpsertOutcome};
use crate::remonline::RemonlineApi;

enum RowOutcome {
    Created,
    Updated,
    Skipped,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    crm: Arc<dyn RemonlineApi>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, crm: Arc<dyn RemonlineApi>) -> Self {
        Self { store, crm }
    }

    /// Imports a batch of rows. Row-level failures are accumulated into the
    /// report and processing continues with the next row.
    pub async fn import_rows(&self, rows: Vec<ImportRow>, create_missing: bool) -> ImportReport {
        let mut report = ImportReport::default();

        for (index, row) in rows.into_iter().enumerate() {
            let line = index + 1;
            match self.import_row(&row, create_missing).await {
                Ok(RowOutcome::Created) => report.created += 1,
                Ok(RowOutcome::Updated) => report.updated += 1,
                Ok(RowOutcome::Skipped) => report.skipped += 1,
                Err(message) => report.record_error(format!("row {line}: {message}")),
            }
        }

        report.success = true;
        report
    }

    /// Parses CSV text and imports it. CSV-level parse failures count as row
    /// errors alongside import failures.
    pub async fn import_csv(&self, csv_text: &str, create_missing: bool) -> ImportReport {
        let (rows, parse_errors) = parse_csv(csv_text);
        let mut report = self.import_rows(rows, create_missing).await;
        for message in parse_errors {
            report.record_error(message);
        }
        report
    }

    /// Pulls the full service catalog from the CRM and imports it, creating
    /// missing brand/series/model rows as it goes.
    pub async fn sync_from_crm(&self) -> Result<ImportReport, AppError> {
        let rows = self
            .crm
            .list_services()
            .await
            .map_err(|e| AppError::Remonline(e.to_string()))?;
        Ok(self.import_rows(rows, true).await)
    }

    async fn import_row(
        &self,
        row: &ImportRow,
        create_missing: bool,
    ) -> Result<RowOutcome, String> {
        // CSV cell padding is transport noise; trim before matching. Name
        // matching itself stays exact (including case), as it always has.
        let brand = row.brand.trim();
        let series = row.series.trim();
        let model = row.model.trim();
        let service = row.service.trim();

        if brand.is_empty() || series.is_empty() || model.is_empty() || service.is_empty() {
            return Err("missing brand, series, model or service".to_string());
        }

        let price = parse_price(&row.price)
            .ok_or_else(|| format!("invalid price '{}'", row.price.trim()))?;
        let warranty_months = parse_int_loose(&row.warranty);
        let duration_minutes = parse_int_loose(&row.duration);

        let brand_row = match self.store.brand_by_name(brand).await.map_err(stringify)? {
            Some(b) => b,
            None if create_missing => self.store.create_brand(brand).await.map_err(stringify)?,
            None => return Ok(RowOutcome::Skipped),
        };

        let series_row = match self
            .store
            .series_by_name(brand_row.id, series)
            .await
            .map_err(stringify)?
        {
            Some(s) => s,
            None if create_missing => self
                .store
                .create_series(brand_row.id, series)
                .await
                .map_err(stringify)?,
            None => return Ok(RowOutcome::Skipped),
        };

        let model_row = match self
            .store
            .model_by_name(series_row.id, model)
            .await
            .map_err(stringify)?
        {
            Some(m) => m,
            None if create_missing => self
                .store
                .create_model(series_row.id, model)
                .await
                .map_err(stringify)?,
            None => return Ok(RowOutcome::Skipped),
        };

        let service_row = match self.store.service_by_name(service).await.map_err(stringify)? {
            Some(s) => s,
            None if create_missing => {
                self.store.create_service(service).await.map_err(stringify)?
            }
            None => return Ok(RowOutcome::Skipped),
        };

        let outcome = self
            .store
            .upsert_price_link(
                model_row.id,
                service_row.id,
                price,
                warranty_months,
                duration_minutes,
            )
            .await
            .map_err(stringify)?;

        Ok(match outcome {
            UpsertOutcome::Created => RowOutcome::Created,
            UpsertOutcome::Updated => RowOutcome::Updated,
        })
    }
}

fn stringify(e: AppError) -> String {
    e.to_string()
}

/// Parses CSV text with headers (brand, series, model, service, price,
/// warranty, duration). Malformed records are reported, not fatal.
pub fn parse_csv(text: &str) -> (Vec<ImportRow>, Vec<String>) {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (index, result) in reader.deserialize::<ImportRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => errors.push(format!("row {}: {}", index + 1, e)),
        }
    }
    (rows, errors)
}
