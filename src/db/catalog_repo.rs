// src/db/catalog_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::CatalogStore;
use crate::models::catalog::{Brand, Model, Series, ServiceItem, UpsertOutcome};

// All interactions with the catalog tables
// (brands -> series -> models -> services -> model_services).
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn brand_by_name(&self, name: &str) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            "SELECT id, name, created_at FROM brands WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(brand)
    }

    async fn create_brand(&self, name: &str) -> Result<Brand, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            "INSERT INTO brands (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(brand)
    }

    async fn series_by_name(
        &self,
        brand_id: Uuid,
        name: &str,
    ) -> Result<Option<Series>, AppError> {
        let series = sqlx::query_as::<_, Series>(
            "SELECT id, brand_id, name, created_at FROM series
             WHERE brand_id = $1 AND name = $2",
        )
        .bind(brand_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(series)
    }

    async fn create_series(&self, brand_id: Uuid, name: &str) -> Result<Series, AppError> {
        let series = sqlx::query_as::<_, Series>(
            "INSERT INTO series (brand_id, name) VALUES ($1, $2)
             RETURNING id, brand_id, name, created_at",
        )
        .bind(brand_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(series)
    }

    async fn model_by_name(
        &self,
        series_id: Uuid,
        name: &str,
    ) -> Result<Option<Model>, AppError> {
        let model = sqlx::query_as::<_, Model>(
            "SELECT id, series_id, name, created_at FROM models
             WHERE series_id = $1 AND name = $2",
        )
        .bind(series_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(model)
    }

    async fn create_model(&self, series_id: Uuid, name: &str) -> Result<Model, AppError> {
        let model = sqlx::query_as::<_, Model>(
            "INSERT INTO models (series_id, name) VALUES ($1, $2)
             RETURNING id, series_id, name, created_at",
        )
        .bind(series_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(model)
    }

    async fn service_by_name(&self, name: &str) -> Result<Option<ServiceItem>, AppError> {
        let service = sqlx::query_as::<_, ServiceItem>(
            "SELECT id, name, created_at FROM services WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    async fn create_service(&self, name: &str) -> Result<ServiceItem, AppError> {
        let service = sqlx::query_as::<_, ServiceItem>(
            "INSERT INTO services (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(service)
    }

    async fn upsert_price_link(
        &self,
        model_id: Uuid,
        service_id: Uuid,
        price: Decimal,
        warranty_months: i32,
        duration_minutes: i32,
    ) -> Result<UpsertOutcome, AppError> {
        // Lookup-then-write, matching the import's per-row flow. The unique
        // constraint on (model_id, service_id) backstops concurrent imports.
        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM model_services WHERE model_id = $1 AND service_id = $2",
        )
        .bind(model_id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE model_services
                     SET price = $2, warranty_months = $3, duration_minutes = $4,
                         updated_at = NOW()
                     WHERE id = $1",
                )
                .bind(id)
                .bind(price)
                .bind(warranty_months)
                .bind(duration_minutes)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                sqlx::query(
                    "INSERT INTO model_services
                         (model_id, service_id, price, warranty_months, duration_minutes)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(model_id)
                .bind(service_id)
                .bind(price)
                .bind(warranty_months)
                .bind(duration_minutes)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
