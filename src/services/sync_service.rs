// src/services/sync_service.rs
//
// Client reconciliation between local accounts and RemOnline clients.
//
// Matching rule: email (case-insensitive exact) wins, then normalized phone.
// An email match is authoritative; a record that only matches by phone is
// left untouched when the email matched someone else. There is no merge
// strategy and no idempotency tracking: a replayed webhook re-runs the whole
// lookup-then-write sequence.

use std::sync::Arc;

use crate::common::error::AppError;
use crate::common::normalize::normalize_phone;
use crate::db::UserStore;
use crate::models::sync::{
    BatchSyncResponse, ClientSyncData, NewRemoteClient, ReconcileOutcome, RemoteClient,
    SyncResult, UserSyncResult,
};
use crate::remonline::RemonlineApi;

/// Fixed page processed per admin-triggered batch run. Larger backlogs are
/// drained by re-invocation (cron or manual trigger).
pub const BATCH_PAGE_SIZE: i64 = 10;

#[derive(Clone)]
pub struct SyncService {
    users: Arc<dyn UserStore>,
    crm: Arc<dyn RemonlineApi>,
}

impl SyncService {
    pub fn new(users: Arc<dyn UserStore>, crm: Arc<dyn RemonlineApi>) -> Self {
        Self { users, crm }
    }

    /// Pushes one local user to the CRM. If a client with the same email
    /// already exists there, that id is returned as-is (no field
    /// reconciliation on this path). Remote failures become
    /// `{success:false, message}`; nothing is thrown past this boundary.
    pub async fn sync_client_to_remote(&self, data: &ClientSyncData) -> SyncResult {
        match self.crm.find_client_by_email(&data.email).await {
            Ok(Some(existing)) => {
                SyncResult::ok(existing.id, "Client already exists in RemOnline")
            }
            Ok(None) => {
                let payload = NewRemoteClient {
                    first_name: data.first_name.clone(),
                    last_name: data.last_name.clone(),
                    email: data.email.clone(),
                    phone: data.phone.clone(),
                    address: data.address.clone(),
                };
                match self.crm.create_client(&payload).await {
                    Ok(created) => SyncResult::ok(created.id, "Client created in RemOnline"),
                    Err(e) => {
                        tracing::warn!("RemOnline client creation failed: {}", e);
                        SyncResult::failed(e.to_string())
                    }
                }
            }
            Err(e) => {
                tracing::warn!("RemOnline client lookup failed: {}", e);
                SyncResult::failed(e.to_string())
            }
        }
    }

    /// Applies a CRM client record to the local database: update the matched
    /// user, or create a new user + profile pair. Clears the matched user's
    /// sessions so the next request re-reads the fresh data.
    pub async fn reconcile_from_remote(
        &self,
        remote: &RemoteClient,
    ) -> Result<ReconcileOutcome, AppError> {
        let email = remote
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let phone = remote.phone.iter().find_map(|p| normalize_phone(p));

        if email.is_none() && phone.is_none() {
            return Err(AppError::WebhookValidation(
                "Payload must contain an email or a phone number".to_string(),
            ));
        }

        let mut matched = None;
        if let Some(email) = email {
            matched = self.users.find_by_email(email).await?;
        }
        if matched.is_none() {
            if let Some(phone) = &phone {
                matched = self.users.find_by_phone(phone).await?;
            }
        }

        let (first_name, last_name) = split_name(remote.name.as_deref());

        if let Some(user) = matched {
            self.users
                .update_from_remote(
                    user.id,
                    first_name.as_deref(),
                    last_name.as_deref(),
                    email,
                    remote.id,
                )
                .await?;
            self.users
                .update_profile_contact(user.id, phone.as_deref(), remote.address.as_deref())
                .await?;
            let cleared = self.users.clear_sessions(user.id).await?;
            tracing::debug!(user_id = %user.id, cleared, "reconciled remote client update");
            return Ok(ReconcileOutcome::Updated(user.id));
        }

        // No anonymous accounts: creation needs an email address.
        let Some(email) = email else {
            return Err(AppError::WebhookValidation(
                "Cannot create a user without an email".to_string(),
            ));
        };

        let user = self
            .users
            .insert_remote_user(
                email,
                first_name.as_deref().unwrap_or(""),
                last_name.as_deref().unwrap_or(""),
                remote.id,
            )
            .await?;

        if let Err(profile_err) = self
            .users
            .insert_profile(user.id, phone.as_deref(), remote.address.as_deref())
            .await
        {
            // Compensating delete, not a transaction: without the profile
            // the user row would be an orphan. The rollback itself is
            // best-effort only.
            if let Err(delete_err) = self.users.delete_user(user.id).await {
                tracing::error!(
                    user_id = %user.id,
                    "failed to roll back user after profile insert error: {}",
                    delete_err
                );
            }
            return Err(profile_err);
        }

        tracing::info!(user_id = %user.id, remonline_id = remote.id, "created user from remote client");
        Ok(ReconcileOutcome::Created(user.id))
    }

    /// Deletes the local counterpart of a CRM client: sessions, then
    /// profile, then the user row, in foreign-key order.
    pub async fn delete_by_remonline_id(&self, remonline_id: i64) -> Result<uuid::Uuid, AppError> {
        let user = self
            .users
            .find_by_remonline_id(remonline_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.users.clear_sessions(user.id).await?;
        self.users.delete_profile(user.id).await?;
        self.users.delete_user(user.id).await?;

        tracing::info!(user_id = %user.id, remonline_id, "deleted user for remote client");
        Ok(user.id)
    }

    /// Admin-triggered batch: pushes one page of unlinked users to the CRM
    /// and persists the ids that come back. Per-user failures end up in the
    /// result list; the batch itself keeps going.
    pub async fn sync_users_batch(&self) -> Result<BatchSyncResponse, AppError> {
        let contacts = self.users.list_unsynced(BATCH_PAGE_SIZE).await?;
        let mut results = Vec::with_capacity(contacts.len());

        for contact in contacts {
            let data = ClientSyncData {
                first_name: contact.first_name.clone(),
                last_name: contact.last_name.clone(),
                email: contact.email.clone(),
                phone: contact
                    .phone
                    .as_deref()
                    .and_then(normalize_phone)
                    .into_iter()
                    .collect(),
                address: contact.address.clone(),
            };

            let mut result = self.sync_client_to_remote(&data).await;

            if result.success {
                if let Some(remonline_id) = result.remonline_id {
                    if let Err(e) = self.users.set_remonline_id(contact.id, remonline_id).await {
                        tracing::error!(user_id = %contact.id, "failed to store remonline id: {}", e);
                        result = SyncResult::failed(format!("failed to store remonline id: {e}"));
                    }
                }
            }

            results.push(UserSyncResult {
                user_id: contact.id,
                email: contact.email,
                result,
            });
        }

        Ok(BatchSyncResponse {
            success: true,
            processed: results.len(),
            results,
        })
    }
}

// "Alice A" -> ("Alice", "A"); single-word names leave the last name empty.
fn split_name(name: Option<&str>) -> (Option<String>, Option<String>) {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(full) => match full.split_once(' ') {
            Some((first, last)) => (Some(first.to_string()), Some(last.trim().to_string())),
            None => (Some(full.to_string()), None),
        },
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};
    use uuid::Uuid;

    use chrono::DateTime;

    use crate::models::auth::{Profile, User, UserContact, UserRole};
    use crate::models::catalog::ImportRow;
    use crate::remonline::RemonlineError;

    #[derive(Debug, Clone)]
    struct FakeProfile {
        user_id: Uuid,
        phone: Option<String>,
        address: Option<String>,
    }

    #[derive(Default)]
    struct FakeUsers {
        users: Mutex<Vec<User>>,
        profiles: Mutex<Vec<FakeProfile>>,
        sessions: Mutex<Vec<Uuid>>,
        fail_profile_insert: bool,
    }

    fn make_user(email: &str, remonline_id: Option<i64>) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Customer,
            remonline_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    impl FakeUsers {
        fn seed(&self, user: User, phone: Option<&str>) {
            self.profiles.lock().unwrap().push(FakeProfile {
                user_id: user.id,
                phone: phone.map(str::to_string),
                address: None,
            });
            self.sessions.lock().unwrap().push(user.id);
            self.users.lock().unwrap().push(user);
        }

        fn user_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        fn phone_of(&self, user_id: Uuid) -> Option<String> {
            self.profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.user_id == user_id)
                .and_then(|p| p.phone.clone())
        }
    }

    #[async_trait]
    impl UserStore for FakeUsers {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.user_id == user_id)
                .map(|p| Profile {
                    user_id: p.user_id,
                    phone: p.phone.clone(),
                    address: p.address.clone(),
                    avatar_url: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                }))
        }

        async fn create_user(
            &self,
            email: &str,
            password_hash: &str,
            first_name: &str,
            last_name: &str,
        ) -> Result<User, AppError> {
            let mut user = make_user(email, None);
            user.password_hash = password_hash.to_string();
            user.first_name = first_name.to_string();
            user.last_name = last_name.to_string();
            user.role = UserRole::User;
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn insert_session(
            &self,
            user_id: Uuid,
            _token: &str,
            _expires_at: DateTime<Utc>,
        ) -> Result<(), AppError> {
            self.sessions.lock().unwrap().push(user_id);
            Ok(())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
            let user_id = self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.phone.as_deref() == Some(phone))
                .map(|p| p.user_id);
            Ok(user_id.and_then(|id| {
                self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
            }))
        }

        async fn find_by_remonline_id(
            &self,
            remonline_id: i64,
        ) -> Result<Option<User>, AppError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.remonline_id == Some(remonline_id))
                .cloned())
        }

        async fn insert_remote_user(
            &self,
            email: &str,
            first_name: &str,
            last_name: &str,
            remonline_id: i64,
        ) -> Result<User, AppError> {
            let mut user = make_user(email, Some(remonline_id));
            user.first_name = first_name.to_string();
            user.last_name = last_name.to_string();
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn insert_profile(
            &self,
            user_id: Uuid,
            phone: Option<&str>,
            address: Option<&str>,
        ) -> Result<(), AppError> {
            if self.fail_profile_insert {
                return Err(AppError::DatabaseError(sqlx::Error::RowNotFound));
            }
            self.profiles.lock().unwrap().push(FakeProfile {
                user_id,
                phone: phone.map(str::to_string),
                address: address.map(str::to_string),
            });
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
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
                if let Some(first) = first_name {
                    user.first_name = first.to_string();
                }
                if let Some(last) = last_name {
                    user.last_name = last.to_string();
                }
                if let Some(email) = email {
                    user.email = email.to_lowercase();
                }
                user.remonline_id = Some(remonline_id);
            }
            Ok(())
        }

        async fn update_profile_contact(
            &self,
            user_id: Uuid,
            phone: Option<&str>,
            address: Option<&str>,
        ) -> Result<(), AppError> {
            let mut profiles = self.profiles.lock().unwrap();
            if let Some(profile) = profiles.iter_mut().find(|p| p.user_id == user_id) {
                if phone.is_some() {
                    profile.phone = phone.map(str::to_string);
                }
                if address.is_some() {
                    profile.address = address.map(str::to_string);
                }
            } else {
                profiles.push(FakeProfile {
                    user_id,
                    phone: phone.map(str::to_string),
                    address: address.map(str::to_string),
                });
            }
            Ok(())
        }

        async fn set_remonline_id(
            &self,
            user_id: Uuid,
            remonline_id: i64,
        ) -> Result<(), AppError> {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
                user.remonline_id = Some(remonline_id);
            }
            Ok(())
        }

        async fn clear_sessions(&self, user_id: Uuid) -> Result<u64, AppError> {
            let mut sessions = self.sessions.lock().unwrap();
            let before = sessions.len();
            sessions.retain(|id| *id != user_id);
            Ok((before - sessions.len()) as u64)
        }

        async fn delete_profile(&self, user_id: Uuid) -> Result<(), AppError> {
            self.profiles.lock().unwrap().retain(|p| p.user_id != user_id);
            Ok(())
        }

        async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError> {
            self.users.lock().unwrap().retain(|u| u.id != user_id);
            Ok(())
        }

        async fn list_unsynced(&self, limit: i64) -> Result<Vec<UserContact>, AppError> {
            let users = self.users.lock().unwrap();
            let profiles = self.profiles.lock().unwrap();
            Ok(users
                .iter()
                .filter(|u| u.remonline_id.is_none())
                .take(limit as usize)
                .map(|u| {
                    let profile = profiles.iter().find(|p| p.user_id == u.id);
                    UserContact {
                        id: u.id,
                        email: u.email.clone(),
                        first_name: u.first_name.clone(),
                        last_name: u.last_name.clone(),
                        remonline_id: u.remonline_id,
                        phone: profile.and_then(|p| p.phone.clone()),
                        address: profile.and_then(|p| p.address.clone()),
                    }
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeCrm {
        clients: Mutex<Vec<RemoteClient>>,
        next_id: AtomicI64,
        fail: bool,
    }

    impl FakeCrm {
        fn with_client(client: RemoteClient) -> Self {
            let crm = Self {
                next_id: AtomicI64::new(1000),
                ..Default::default()
            };
            crm.clients.lock().unwrap().push(client);
            crm
        }

        fn client_count(&self) -> usize {
            self.clients.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RemonlineApi for FakeCrm {
        async fn find_client_by_email(
            &self,
            email: &str,
        ) -> Result<Option<RemoteClient>, RemonlineError> {
            if self.fail {
                return Err(RemonlineError::Network("connection refused".to_string()));
            }
            Ok(self
                .clients
                .lock()
                .unwrap()
                .iter()
                .find(|c| {
                    c.email
                        .as_deref()
                        .is_some_and(|e| e.eq_ignore_ascii_case(email))
                })
                .cloned())
        }

        async fn find_client_by_phone(
            &self,
            phone: &str,
        ) -> Result<Option<RemoteClient>, RemonlineError> {
            if self.fail {
                return Err(RemonlineError::Network("connection refused".to_string()));
            }
            Ok(self
                .clients
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.phone.iter().any(|p| p == phone))
                .cloned())
        }

        async fn create_client(
            &self,
            client: &NewRemoteClient,
        ) -> Result<RemoteClient, RemonlineError> {
            if self.fail {
                return Err(RemonlineError::Network("connection refused".to_string()));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst).max(1);
            let created = RemoteClient {
                id,
                name: Some(format!("{} {}", client.first_name, client.last_name)),
                email: Some(client.email.clone()),
                phone: client.phone.clone(),
                address: client.address.clone(),
            };
            self.clients.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn list_services(&self) -> Result<Vec<ImportRow>, RemonlineError> {
            Ok(Vec::new())
        }
    }

    fn service(users: Arc<FakeUsers>, crm: Arc<FakeCrm>) -> SyncService {
        SyncService::new(users, crm)
    }

    fn alice_payload() -> RemoteClient {
        RemoteClient {
            id: 501,
            name: Some("Alice A".to_string()),
            email: Some("alice@example.com".to_string()),
            phone: vec!["+420123456789".to_string()],
            address: None,
        }
    }

    #[tokio::test]
    async fn creates_user_and_profile_from_new_remote_client() {
        let users = Arc::new(FakeUsers::default());
        let sync = service(users.clone(), Arc::new(FakeCrm::default()));

        let outcome = sync.reconcile_from_remote(&alice_payload()).await.unwrap();

        let user_id = outcome.user_id();
        assert!(matches!(outcome, ReconcileOutcome::Created(_)));
        let stored = users.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(stored.remonline_id, Some(501));
        assert_eq!(stored.first_name, "Alice");
        assert_eq!(users.phone_of(user_id).as_deref(), Some("+420123456789"));
    }

    #[tokio::test]
    async fn updates_phone_matched_user_and_clears_sessions() {
        let users = Arc::new(FakeUsers::default());
        let existing = make_user("bob@example.com", Some(501));
        let existing_id = existing.id;
        users.seed(existing, Some("+420123456789"));

        let sync = service(users.clone(), Arc::new(FakeCrm::default()));
        // client_updated carrying only the phone: matched via phone lookup.
        let payload = RemoteClient {
            id: 501,
            name: None,
            email: None,
            phone: vec!["+420123456789".to_string()],
            address: None,
        };

        let outcome = sync.reconcile_from_remote(&payload).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Updated(existing_id));
        // Email untouched, sessions cleared.
        let stored = users.find_by_email("bob@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id, existing_id);
        assert!(users.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn email_match_wins_over_phone_match() {
        let users = Arc::new(FakeUsers::default());
        let by_email = make_user("alice@example.com", None);
        let by_email_id = by_email.id;
        users.seed(by_email, None);
        let by_phone = make_user("someone.else@example.com", None);
        let by_phone_id = by_phone.id;
        users.seed(by_phone, Some("+420123456789"));

        let sync = service(users.clone(), Arc::new(FakeCrm::default()));
        let outcome = sync.reconcile_from_remote(&alice_payload()).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Updated(by_email_id));
        // The phone-matched record stays untouched; no merge happens.
        let other = users
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == by_phone_id)
            .cloned()
            .unwrap();
        assert_eq!(other.remonline_id, None);
    }

    #[tokio::test]
    async fn replay_with_email_updates_in_place() {
        let users = Arc::new(FakeUsers::default());
        let sync = service(users.clone(), Arc::new(FakeCrm::default()));

        let first = sync.reconcile_from_remote(&alice_payload()).await.unwrap();
        let second = sync.reconcile_from_remote(&alice_payload()).await.unwrap();

        assert!(matches!(first, ReconcileOutcome::Created(_)));
        assert_eq!(second, ReconcileOutcome::Updated(first.user_id()));
        assert_eq!(users.user_count(), 1);
    }

    #[tokio::test]
    async fn replay_without_email_and_changed_phone_falls_to_create_path() {
        // Documents the duplicate-creation hazard: without an email, a
        // replay whose phone no longer matches skips the in-place update
        // and goes down the create path.
        let users = Arc::new(FakeUsers::default());
        let existing = make_user("alice@example.com", Some(501));
        users.seed(existing, Some("+420123456789"));

        let sync = service(users.clone(), Arc::new(FakeCrm::default()));
        let payload = RemoteClient {
            id: 501,
            name: None,
            email: None,
            phone: vec!["+420987654321".to_string()],
            address: None,
        };

        let err = sync.reconcile_from_remote(&payload).await.unwrap_err();
        // Creation is only stopped by the no-anonymous-accounts rule.
        assert!(matches!(err, AppError::WebhookValidation(_)));
        assert_eq!(users.user_count(), 1);
    }

    #[tokio::test]
    async fn rejects_payload_without_email_and_phone() {
        let sync = service(Arc::new(FakeUsers::default()), Arc::new(FakeCrm::default()));
        let payload = RemoteClient {
            id: 501,
            name: Some("Ghost".to_string()),
            email: None,
            phone: Vec::new(),
            address: None,
        };

        let err = sync.reconcile_from_remote(&payload).await.unwrap_err();
        assert!(matches!(err, AppError::WebhookValidation(_)));
    }

    #[tokio::test]
    async fn rolls_back_user_when_profile_insert_fails() {
        let users = Arc::new(FakeUsers {
            fail_profile_insert: true,
            ..Default::default()
        });
        let sync = service(users.clone(), Arc::new(FakeCrm::default()));

        let err = sync.reconcile_from_remote(&alice_payload()).await.unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(users.user_count(), 0, "compensating delete removed the orphan");
    }

    #[tokio::test]
    async fn round_trip_keeps_the_original_remonline_id() {
        let users = Arc::new(FakeUsers::default());
        let crm = Arc::new(FakeCrm::with_client(alice_payload()));
        let sync = service(users.clone(), crm.clone());

        sync.reconcile_from_remote(&alice_payload()).await.unwrap();

        let data = ClientSyncData {
            first_name: "Alice".to_string(),
            last_name: "A".to_string(),
            email: "alice@example.com".to_string(),
            phone: vec!["+420123456789".to_string()],
            address: None,
        };
        let result = sync.sync_client_to_remote(&data).await;

        assert!(result.success);
        assert_eq!(result.remonline_id, Some(501));
        assert_eq!(crm.client_count(), 1, "no duplicate remote client created");
    }

    #[tokio::test]
    async fn remote_failure_becomes_failed_result() {
        let crm = Arc::new(FakeCrm {
            fail: true,
            ..Default::default()
        });
        let sync = service(Arc::new(FakeUsers::default()), crm);

        let result = sync
            .sync_client_to_remote(&ClientSyncData {
                first_name: "Alice".to_string(),
                last_name: "A".to_string(),
                email: "alice@example.com".to_string(),
                phone: Vec::new(),
                address: None,
            })
            .await;

        assert!(!result.success);
        assert!(result.message.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn batch_sync_links_unsynced_users() {
        let users = Arc::new(FakeUsers::default());
        users.seed(make_user("one@example.com", None), Some("+420111222333"));
        users.seed(make_user("two@example.com", None), None);

        let crm = Arc::new(FakeCrm {
            next_id: AtomicI64::new(700),
            ..Default::default()
        });
        let sync = service(users.clone(), crm);

        let response = sync.sync_users_batch().await.unwrap();

        assert_eq!(response.processed, 2);
        assert!(response.results.iter().all(|r| r.result.success));
        assert!(
            users
                .users
                .lock()
                .unwrap()
                .iter()
                .all(|u| u.remonline_id.is_some())
        );
    }

    #[tokio::test]
    async fn delete_removes_sessions_profile_and_user() {
        let users = Arc::new(FakeUsers::default());
        let existing = make_user("alice@example.com", Some(501));
        let existing_id = existing.id;
        users.seed(existing, Some("+420123456789"));

        let sync = service(users.clone(), Arc::new(FakeCrm::default()));
        let deleted = sync.delete_by_remonline_id(501).await.unwrap();

        assert_eq!(deleted, existing_id);
        assert_eq!(users.user_count(), 0);
        assert!(users.profiles.lock().unwrap().is_empty());
        assert!(users.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_user_not_found() {
        let sync = service(Arc::new(FakeUsers::default()), Arc::new(FakeCrm::default()));
        let err = sync.delete_by_remonline_id(999).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[test]
    fn split_name_handles_single_and_multi_word() {
        assert_eq!(
            split_name(Some("Alice A")),
            (Some("Alice".to_string()), Some("A".to_string()))
        );
        assert_eq!(split_name(Some("Alice")), (Some("Alice".to_string()), None));
        assert_eq!(split_name(Some("  ")), (None, None));
        assert_eq!(split_name(None), (None, None));
    }
}
