// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, sync::Arc, time::Duration};

use crate::{
    db::{CatalogRepository, UserRepository, UserStore},
    remonline::RemonlineClient,
    services::{auth::AuthService, catalog_service::CatalogService, sync_service::SyncService},
};

const DEFAULT_REMONLINE_API_URL: &str = "https://api.remonline.app";

// Shared state accessible across the whole application.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub webhook_secret: String,
    pub auth_service: AuthService,
    pub sync_service: SyncService,
    pub catalog_service: CatalogService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let webhook_secret =
            env::var("REMONLINE_WEBHOOK_SECRET").expect("REMONLINE_WEBHOOK_SECRET must be set");
        let remonline_api_key =
            env::var("REMONLINE_API_KEY").expect("REMONLINE_API_KEY must be set");
        let remonline_api_url =
            env::var("REMONLINE_API_URL").unwrap_or_else(|_| DEFAULT_REMONLINE_API_URL.to_string());

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("database connection established");

        // Assemble the dependency graph.
        let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db_pool.clone()));
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let remonline = Arc::new(RemonlineClient::new(remonline_api_url, remonline_api_key));

        let auth_service = AuthService::new(users.clone(), jwt_secret.clone());
        let sync_service = SyncService::new(users, remonline.clone());
        let catalog_service = CatalogService::new(Arc::new(catalog_repo), remonline);

        Ok(Self {
            db_pool,
            jwt_secret,
            webhook_secret,
            auth_service,
            sync_service,
            catalog_service,
        })
    }
}
