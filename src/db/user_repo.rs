// src/db/user_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::UserStore;
use crate::models::auth::{Profile, User, UserContact};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, remonline_id, created_at, updated_at";

// All interactions with the users / profiles / sessions tables.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, role)
             VALUES (LOWER($1), $2, $3, $4, 'user')
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    async fn insert_session(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (user_id, token, expires_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, phone, address, avatar_url, created_at, updated_at
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name,
                    u.role, u.remonline_id, u.created_at, u.updated_at
             FROM users u
             INNER JOIN profiles p ON p.user_id = u.id
             WHERE p.phone = $1
             ORDER BY u.created_at ASC
             LIMIT 1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_remonline_id(&self, remonline_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE remonline_id = $1"
        ))
        .bind(remonline_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_remote_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        remonline_id: i64,
    ) -> Result<User, AppError> {
        // CRM-originated accounts carry no usable password; the storefront
        // offers a reset flow before first login.
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, role, remonline_id)
             VALUES (LOWER($1), '', $2, $3, 'customer', $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(remonline_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    async fn insert_profile(
        &self,
        user_id: Uuid,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO profiles (user_id, phone, address) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(phone)
            .bind(address)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_from_remote(
        &self,
        user_id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        remonline_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 email = COALESCE(LOWER($4), email),
                 remonline_id = $5,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(remonline_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_profile_contact(
        &self,
        user_id: Uuid,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), AppError> {
        // Some legacy accounts predate the profiles table, so upsert.
        sqlx::query(
            "INSERT INTO profiles (user_id, phone, address)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE
             SET phone = COALESCE(EXCLUDED.phone, profiles.phone),
                 address = COALESCE(EXCLUDED.address, profiles.address),
                 updated_at = NOW()",
        )
        .bind(user_id)
        .bind(phone)
        .bind(address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_remonline_id(&self, user_id: Uuid, remonline_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET remonline_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(remonline_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_sessions(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_unsynced(&self, limit: i64) -> Result<Vec<UserContact>, AppError> {
        let users = sqlx::query_as::<_, UserContact>(
            "SELECT u.id, u.email, u.first_name, u.last_name, u.remonline_id,
                    p.phone, p.address
             FROM users u
             LEFT JOIN profiles p ON p.user_id = u.id
             WHERE u.remonline_id IS NULL
             ORDER BY u.created_at ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
