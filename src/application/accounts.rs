//! Account service: signup, login, sessions and per-user history.
//!
//! Passwords arrive in `Zeroizing` buffers and are only ever stored as
//! Argon2id hashes. Sessions are opaque tokens resolved through the
//! injected [`SessionStore`].

use std::sync::Arc;

use serde::Serialize;

use crate::domain::credentials::{hash_password, verify_password};
use crate::domain::{Password, PredictionRecord};
use crate::ports::{PredictionPage, SessionStore, Storage};
use crate::AsthmaCareError;

/// Answer to a session check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Result of an admin cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub records_removed: usize,
}

impl CleanupReport {
    #[must_use]
    pub fn message(&self) -> String {
        if self.records_removed == 0 {
            "No invalid records found".to_string()
        } else {
            format!("Cleaned up {} invalid records", self.records_removed)
        }
    }
}

/// Service for accounts and owner-scoped reads.
pub struct AccountService<S>
where
    S: Storage,
{
    storage: Arc<S>,
    sessions: Arc<dyn SessionStore>,
    admin_user: String,
}

impl<S> AccountService<S>
where
    S: Storage,
    S::Error: Into<crate::adapters::StorageError>,
{
    /// Create a new account service.
    pub fn new(storage: Arc<S>, sessions: Arc<dyn SessionStore>, admin_user: impl Into<String>) -> Self {
        Self {
            storage,
            sessions,
            admin_user: admin_user.into(),
        }
    }

    fn storage_err(e: S::Error) -> AsthmaCareError {
        AsthmaCareError::Storage(e.into())
    }

    /// Register a new user.
    ///
    /// # Errors
    /// `PasswordMismatch` if the confirmation differs, `UsernameTaken` if the
    /// name is registered, `Validation` for an empty username or password.
    pub fn signup(
        &self,
        username: &str,
        password: &Password,
        confirm_password: &Password,
    ) -> Result<(), AsthmaCareError> {
        if username.is_empty() || password.is_empty() {
            return Err(AsthmaCareError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        if password.as_str() != confirm_password.as_str() {
            return Err(AsthmaCareError::PasswordMismatch);
        }

        // Cheap pre-check before paying for the hash.
        if self.storage.find_user(username).map_err(Self::storage_err)?.is_some() {
            return Err(AsthmaCareError::UsernameTaken);
        }

        let hash = hash_password(password)?;
        if !self.storage.create_user(username, &hash).map_err(Self::storage_err)? {
            return Err(AsthmaCareError::UsernameTaken);
        }

        tracing::info!("Registered user {}", username);
        Ok(())
    }

    /// Check credentials and open a session.
    ///
    /// # Returns
    /// The session token.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown user or wrong password;
    /// `SessionUnavailable` if no session could be recorded.
    pub fn login(&self, username: &str, password: &Password) -> Result<String, AsthmaCareError> {
        let Some(account) = self.storage.find_user(username).map_err(Self::storage_err)? else {
            tracing::info!("Login rejected: unknown user");
            return Err(AsthmaCareError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_hash)? {
            tracing::info!("Login rejected for {}", username);
            return Err(AsthmaCareError::InvalidCredentials);
        }

        let token = self
            .sessions
            .open(&account.username)
            .ok_or(AsthmaCareError::SessionUnavailable)?;
        tracing::info!("User {} logged in", account.username);
        Ok(token)
    }

    /// End a session. Unknown or missing tokens are ignored.
    pub fn logout(&self, token: Option<&str>) -> bool {
        let revoked = token.is_some_and(|t| self.sessions.revoke(t));
        tracing::debug!("Logout: session revoked={}", revoked);
        revoked
    }

    /// Resolve a token to a username.
    ///
    /// # Errors
    /// `AuthenticationRequired` if the token is missing, unknown or expired.
    pub fn authenticate(&self, token: Option<&str>) -> Result<String, AsthmaCareError> {
        token
            .and_then(|t| self.sessions.lookup(t))
            .ok_or(AsthmaCareError::AuthenticationRequired)
    }

    /// Report whether the token belongs to a live session.
    #[must_use]
    pub fn check_session(&self, token: Option<&str>) -> SessionStatus {
        match self.authenticate(token) {
            Ok(username) => SessionStatus {
                is_authenticated: true,
                username: Some(username),
            },
            Err(_) => SessionStatus {
                is_authenticated: false,
                username: None,
            },
        }
    }

    /// Every complete prediction owned by the session's user, oldest first.
    ///
    /// # Errors
    /// `AuthenticationRequired` without a live session; storage errors.
    pub fn results(&self, token: Option<&str>) -> Result<Vec<PredictionRecord>, AsthmaCareError> {
        let username = self.authenticate(token)?;
        let records = self
            .storage
            .load_predictions_for_owner(&username)
            .map_err(Self::storage_err)?;
        tracing::debug!("Loaded {} results for {}", records.len(), username);
        Ok(records)
    }

    /// One page of the session user's predictions, oldest first.
    ///
    /// # Errors
    /// `AuthenticationRequired` without a live session; storage errors.
    pub fn results_page(
        &self,
        token: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PredictionPage, AsthmaCareError> {
        let username = self.authenticate(token)?;
        self.storage
            .load_predictions_for_owner_paginated(&username, offset, limit)
            .map_err(Self::storage_err)
    }

    /// Remove incomplete prediction rows. Admin only.
    ///
    /// # Errors
    /// `Unauthorized` unless the session belongs to the admin user;
    /// storage errors.
    pub fn cleanup(&self, token: Option<&str>) -> Result<CleanupReport, AsthmaCareError> {
        let username = token.and_then(|t| self.sessions.lookup(t));
        if username.as_deref() != Some(self.admin_user.as_str()) {
            tracing::warn!("Cleanup refused for non-admin caller");
            return Err(AsthmaCareError::Unauthorized);
        }

        let records_removed = self
            .storage
            .purge_incomplete_predictions()
            .map_err(Self::storage_err)?;
        tracing::info!("Cleanup removed {} incomplete records", records_removed);
        Ok(CleanupReport { records_removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sessions::MemorySessionStore;
    use crate::adapters::sqlite::SqliteStorage;
    use crate::domain::{recommend, Demographics, Severity, SymptomVector};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::time::Duration;

    fn pw(s: &str) -> Password {
        Password::new(s.to_string())
    }

    fn create_test_service() -> (AccountService<SqliteStorage>, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::in_memory().expect("Should create db"));
        let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(3600)));
        (AccountService::new(storage.clone(), sessions, "admin"), storage)
    }

    fn store_prediction(storage: &SqliteStorage, owner: &str, minutes: i64) {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + ChronoDuration::minutes(minutes);
        let record = PredictionRecord::build(
            Some(owner),
            SymptomVector::all_present(),
            &Demographics::new(40, "female"),
            Severity::Severe,
            &recommend(Severity::Severe),
            now,
        );
        storage.insert_prediction(&record).expect("Should insert");
    }

    #[test]
    fn test_signup_and_login() {
        let (service, _) = create_test_service();

        service.signup("alice", &pw("s3cret"), &pw("s3cret")).expect("Should sign up");
        let token = service.login("alice", &pw("s3cret")).expect("Should log in");

        let status = service.check_session(Some(&token));
        assert!(status.is_authenticated);
        assert_eq!(status.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_signup_rejections() {
        let (service, _) = create_test_service();

        assert!(matches!(
            service.signup("alice", &pw("one"), &pw("two")),
            Err(AsthmaCareError::PasswordMismatch)
        ));

        service.signup("alice", &pw("one"), &pw("one")).expect("Should sign up");
        assert!(matches!(
            service.signup("alice", &pw("other"), &pw("other")),
            Err(AsthmaCareError::UsernameTaken)
        ));
        assert!(matches!(
            service.signup("", &pw("x"), &pw("x")),
            Err(AsthmaCareError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_credentials() {
        let (service, _) = create_test_service();
        service.signup("bob", &pw("right"), &pw("right")).expect("Should sign up");

        assert!(matches!(
            service.login("bob", &pw("wrong")),
            Err(AsthmaCareError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("nobody", &pw("right")),
            Err(AsthmaCareError::InvalidCredentials)
        ));
    }

    /// Registry that cannot record sessions.
    struct ClosedSessions;

    impl SessionStore for ClosedSessions {
        fn open(&self, _: &str) -> Option<String> {
            None
        }
        fn lookup(&self, _: &str) -> Option<String> {
            None
        }
        fn revoke(&self, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_login_fails_when_session_not_recorded() {
        let storage = Arc::new(SqliteStorage::in_memory().expect("Should create db"));
        let service = AccountService::new(storage, Arc::new(ClosedSessions), "admin");
        service.signup("gina", &pw("pw"), &pw("pw")).expect("Should sign up");

        assert!(matches!(
            service.login("gina", &pw("pw")),
            Err(AsthmaCareError::SessionUnavailable)
        ));
    }

    #[test]
    fn test_logout_ends_session() {
        let (service, _) = create_test_service();
        service.signup("carol", &pw("pw"), &pw("pw")).expect("Should sign up");
        let token = service.login("carol", &pw("pw")).expect("Should log in");

        assert!(service.logout(Some(&token)));
        assert!(!service.check_session(Some(&token)).is_authenticated);
        assert!(!service.logout(Some(&token)));
        assert!(!service.logout(None));
    }

    #[test]
    fn test_results_require_session() {
        let (service, _) = create_test_service();

        assert!(matches!(service.results(None), Err(AsthmaCareError::AuthenticationRequired)));
        assert!(matches!(
            service.results(Some("not-a-token")),
            Err(AsthmaCareError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_results_are_owner_scoped_oldest_first() {
        let (service, storage) = create_test_service();
        service.signup("dave", &pw("pw"), &pw("pw")).expect("Should sign up");
        let token = service.login("dave", &pw("pw")).expect("Should log in");

        store_prediction(&storage, "dave", 0);
        store_prediction(&storage, "dave", 10);
        store_prediction(&storage, "erin", 5);

        let results = service.results(Some(&token)).expect("Should load");
        assert_eq!(results.len(), 2);
        assert!(results[0].timestamp < results[1].timestamp);
        assert!(results.iter().all(|r| r.owner.as_deref() == Some("dave")));

        let page = service.results_page(Some(&token), 0, 1).expect("Should page");
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.next_offset(), Some(1));
    }

    #[test]
    fn test_cleanup_is_admin_only() {
        let (service, _) = create_test_service();
        service.signup("frank", &pw("pw"), &pw("pw")).expect("Should sign up");
        service.signup("admin", &pw("root"), &pw("root")).expect("Should sign up");

        let user = service.login("frank", &pw("pw")).expect("Should log in");
        assert!(matches!(service.cleanup(Some(&user)), Err(AsthmaCareError::Unauthorized)));
        assert!(matches!(service.cleanup(None), Err(AsthmaCareError::Unauthorized)));

        let admin = service.login("admin", &pw("root")).expect("Should log in");
        let report = service.cleanup(Some(&admin)).expect("Should clean up");
        assert_eq!(report.records_removed, 0);
        assert_eq!(report.message(), "No invalid records found");
    }

    #[test]
    fn test_cleanup_message() {
        assert_eq!(
            CleanupReport { records_removed: 3 }.message(),
            "Cleaned up 3 invalid records"
        );
    }

    #[test]
    fn test_session_status_serialization() {
        let status = SessionStatus {
            is_authenticated: false,
            username: None,
        };
        assert_eq!(
            serde_json::to_value(&status).expect("Should serialize"),
            serde_json::json!({"isAuthenticated": false})
        );
    }
}
