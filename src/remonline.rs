// src/remonline.rs
//
// Outbound side of the CRM integration. `RemonlineApi` is the seam the sync
// services depend on; `RemonlineClient` is the reqwest implementation talking
// to the real API.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    catalog::ImportRow,
    sync::{NewRemoteClient, RemoteClient},
};

pub mod client;
pub use client::RemonlineClient;

#[derive(Debug, Error)]
pub enum RemonlineError {
    #[error("network error: {0}")]
    Network(String),

    #[error("RemOnline API returned {0}: {1}")]
    Api(u16, String),

    #[error("unexpected RemOnline response: {0}")]
    Unexpected(String),
}

#[async_trait]
pub trait RemonlineApi: Send + Sync {
    /// Looks up a CRM client by email (case-insensitive exact match).
    async fn find_client_by_email(
        &self,
        email: &str,
    ) -> Result<Option<RemoteClient>, RemonlineError>;

    /// Looks up a CRM client by normalized phone number.
    async fn find_client_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<RemoteClient>, RemonlineError>;

    /// Creates a new CRM client and returns the stored record with its id.
    async fn create_client(
        &self,
        client: &NewRemoteClient,
    ) -> Result<RemoteClient, RemonlineError>;

    /// Fetches the full CRM service catalog as importable rows.
    async fn list_services(&self) -> Result<Vec<ImportRow>, RemonlineError>;
}
