// src/test_support.rs
//
// Shared fixtures for handler and middleware tests: an AppState wired over
// a lazily-connected pool (nothing here ever reaches the database) and a
// JWT factory matching the auth service's claims.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::config::AppState;
use crate::db::{CatalogRepository, UserRepository, UserStore};
use crate::models::auth::{Claims, Profile, User, UserContact};
use crate::remonline::{RemonlineApi, RemonlineClient};
use crate::services::{
    auth::AuthService, catalog_service::CatalogService, sync_service::SyncService,
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/devicehelp_test")
        .expect("lazy pool")
}

/// AppState over the lazy pool and real repositories. Tests built on this
/// only exercise code paths that stop before the database.
pub fn lazy_state() -> AppState {
    state_with_users(Arc::new(UserRepository::new(lazy_pool())))
}

pub fn state_with_users(users: Arc<dyn UserStore>) -> AppState {
    let pool = lazy_pool();
    let crm: Arc<dyn RemonlineApi> = Arc::new(RemonlineClient::new(
        "http://localhost:9".to_string(),
        "test-key".to_string(),
    ));
    AppState {
        db_pool: pool.clone(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        auth_service: AuthService::new(users.clone(), TEST_JWT_SECRET.to_string()),
        sync_service: SyncService::new(users, crm.clone()),
        catalog_service: CatalogService::new(Arc::new(CatalogRepository::new(pool)), crm),
    }
}

pub fn token_for(user_id: Uuid, secret: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .expect("token encoding")
}

/// Read-only store seeded with users and profiles. The guard and handler
/// tests only look accounts up; everything else is unreachable from them.
pub struct StaticUsers {
    pub users: Vec<User>,
    pub profiles: Vec<Profile>,
}

#[async_trait::async_trait]
impl UserStore for StaticUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn find_by_phone(&self, _phone: &str) -> Result<Option<User>, AppError> {
        unimplemented!("not used by these tests")
    }

    async fn find_by_remonline_id(&self, _remonline_id: i64) -> Result<Option<User>, AppError> {
        unimplemented!("not used by these tests")
    }

    async fn create_user(
        &self,
        _email: &str,
        _password_hash: &str,
        _first_name: &str,
        _last_name: &str,
    ) -> Result<User, AppError> {
        unimplemented!("not used by these tests")
    }

    async fn insert_session(
        &self,
        _user_id: Uuid,
        _token: &str,
        _expires_at: chrono::DateTime<Utc>,
    ) -> Result<(), AppError> {
        unimplemented!("not used by these tests")
    }

    async fn insert_remote_user(
        &self,
        _email: &str,
        _first_name: &str,
        _last_name: &str,
        _remonline_id: i64,
    ) -> Result<User, AppError> {
        unimplemented!("not used by these tests")
    }

    async fn insert_profile(
        &self,
        _user_id: Uuid,
        _phone: Option<&str>,
        _address: Option<&str>,
    ) -> Result<(), AppError> {
        unimplemented!("not used by these tests")
    }

    async fn update_from_remote(
        &self,
        _user_id: Uuid,
        _first_name: Option<&str>,
        _last_name: Option<&str>,
        _email: Option<&str>,
        _remonline_id: i64,
    ) -> Result<(), AppError> {
        unimplemented!("not used by these tests")
    }

    async fn update_profile_contact(
        &self,
        _user_id: Uuid,
        _phone: Option<&str>,
        _address: Option<&str>,
    ) -> Result<(), AppError> {
        unimplemented!("not used by these tests")
    }

    async fn set_remonline_id(&self, _user_id: Uuid, _remonline_id: i64) -> Result<(), AppError> {
        unimplemented!("not used by these tests")
    }

    async fn clear_sessions(&self, _user_id: Uuid) -> Result<u64, AppError> {
        unimplemented!("not used by these tests")
    }

    async fn delete_profile(&self, _user_id: Uuid) -> Result<(), AppError> {
        unimplemented!("not used by these tests")
    }

    async fn delete_user(&self, _user_id: Uuid) -> Result<(), AppError> {
        unimplemented!("not used by these tests")
    }

    async fn list_unsynced(&self, _limit: i64) -> Result<Vec<UserContact>, AppError> {
        unimplemented!("not used by these tests")
    }
}
