// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Webhooks ---
        handlers::webhook::remonline_webhook,
        handlers::webhook::delete_account_webhook,

        // --- Admin ---
        handlers::admin::sync_remonline_clients,
        handlers::admin::sync_remonline_services,
        handlers::admin::bulk_import_services,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::Profile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- Sync ---
            models::sync::RemoteClient,
            models::sync::WebhookPayload,
            models::sync::WebhookClientData,
            models::sync::DeleteAccountPayload,
            models::sync::DeleteContext,
            models::sync::EmployeeActor,
            models::sync::SyncResult,
            models::sync::UserSyncResult,
            models::sync::BatchSyncResponse,
            models::sync::WebhookAck,

            // --- Catalog ---
            models::catalog::Brand,
            models::catalog::Series,
            models::catalog::Model,
            models::catalog::ServiceItem,
            models::catalog::ImportRow,
            models::catalog::ImportReport,
            handlers::admin::BulkImportPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Current user data"),
        (name = "Webhooks", description = "Inbound RemOnline CRM notifications"),
        (name = "Admin", description = "Manual sync triggers and bulk import")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
