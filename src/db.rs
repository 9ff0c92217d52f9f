// src/db.rs
//
// Persistence layer. The store traits are the seams the sync services
// depend on; the `*Repository` structs are their PostgreSQL implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::{
    auth::{Profile, User, UserContact},
    catalog::{Brand, Model, Series, ServiceItem, UpsertOutcome},
};

pub mod catalog_repo;
pub mod user_repo;
pub use catalog_repo::CatalogRepository;
pub use user_repo::UserRepository;

/// Local-user persistence as seen by the client reconciler and the auth
/// layer.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;
    async fn find_by_remonline_id(&self, remonline_id: i64) -> Result<Option<User>, AppError>;
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Registration path: a local account with a password hash.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, AppError>;

    async fn insert_session(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Inserts a user discovered on the CRM side (role `customer`, no
    /// local password).
    async fn insert_remote_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        remonline_id: i64,
    ) -> Result<User, AppError>;

    async fn insert_profile(
        &self,
        user_id: Uuid,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), AppError>;

    /// Applies mutable fields from a remote record. `None` leaves the
    /// current value untouched (last-writer-wins, no timestamp comparison).
    async fn update_from_remote(
        &self,
        user_id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        remonline_id: i64,
    ) -> Result<(), AppError>;

    async fn update_profile_contact(
        &self,
        user_id: Uuid,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), AppError>;

    async fn set_remonline_id(&self, user_id: Uuid, remonline_id: i64) -> Result<(), AppError>;

    async fn clear_sessions(&self, user_id: Uuid) -> Result<u64, AppError>;
    async fn delete_profile(&self, user_id: Uuid) -> Result<(), AppError>;
    async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError>;

    /// Users not yet linked to a CRM client, oldest first, one fixed page.
    async fn list_unsynced(&self, limit: i64) -> Result<Vec<UserContact>, AppError>;
}

/// Catalog persistence as seen by the importer. Lookups are by exact name,
/// scoped to the parent row.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn brand_by_name(&self, name: &str) -> Result<Option<Brand>, AppError>;
    async fn create_brand(&self, name: &str) -> Result<Brand, AppError>;

    async fn series_by_name(&self, brand_id: Uuid, name: &str)
    -> Result<Option<Series>, AppError>;
    async fn create_series(&self, brand_id: Uuid, name: &str) -> Result<Series, AppError>;

    async fn model_by_name(&self, series_id: Uuid, name: &str)
    -> Result<Option<Model>, AppError>;
    async fn create_model(&self, series_id: Uuid, name: &str) -> Result<Model, AppError>;

    async fn service_by_name(&self, name: &str) -> Result<Option<ServiceItem>, AppError>;
    async fn create_service(&self, name: &str) -> Result<ServiceItem, AppError>;

    async fn upsert_price_link(
        &self,
        model_id: Uuid,
        service_id: Uuid,
        price: Decimal,
        warranty_months: i32,
        duration_minutes: i32,
    ) -> Result<UpsertOutcome, AppError>;
}
