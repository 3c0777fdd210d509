//! Permission checks against the user store.
//!
//! Fail-closed: a missing session, a rejected session, a missing user, a user
//! without a role and a store fault all answer `false`.

use std::sync::Arc;
use tracing::{debug, error};

use super::{
    store::{RoleStore, UserRole},
    transport::SessionRequest,
    verifier::{Redirect, SessionVerifier, Verification},
};

#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: Arc<SessionVerifier>,
    store: Arc<dyn RoleStore>,
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl AuthorizationGate {
    #[must_use]
    pub fn new(verifier: Arc<SessionVerifier>, store: Arc<dyn RoleStore>) -> Self {
        Self { verifier, store }
    }

    /// Whether the caller's stored role name is exactly `permission`.
    pub async fn has_permission(&self, request: &SessionRequest, permission: &str) -> bool {
        self.authorize(request, permission).await.unwrap_or(false)
    }

    /// Same decision as [`Self::has_permission`], but a session the verifier
    /// turned away comes back as its [`Redirect`] so the transport can still
    /// honour a cookie purge. `Err` always means "denied".
    ///
    /// # Errors
    /// Returns the verifier's redirect when the session is not authenticated.
    pub async fn authorize(
        &self,
        request: &SessionRequest,
        permission: &str,
    ) -> Result<bool, Redirect> {
        let Some(token) = request.token() else {
            debug!("No session token, permission denied");
            return Ok(false);
        };

        let user = match self.verifier.verify(Some(token), request.referer()) {
            Verification::Authenticated(user) => user,
            Verification::Redirect(redirect) => return Err(redirect),
            Verification::Unauthenticated => return Ok(false),
        };

        match self.store.lookup_role(user.id).await {
            Ok(Some(UserRole {
                role_name: Some(role_name),
            })) => Ok(role_name == permission),
            Ok(Some(UserRole { role_name: None })) => {
                debug!("User {} has no role assigned", user.id);
                Ok(false)
            }
            Ok(None) => {
                debug!("User {} not found in store", user.id);
                Ok(false)
            }
            Err(err) => {
                error!("Failed to lookup role for user {}: {err:#}", user.id);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{MemoryRoleStore, NOW, mint, verifier};
    use serde_json::json;

    fn alice_token() -> String {
        mint(&json!({"id": 7, "username": "alice", "exp": NOW + 3600}))
    }

    fn gate_with(store: Arc<MemoryRoleStore>) -> AuthorizationGate {
        AuthorizationGate::new(Arc::new(verifier()), store)
    }

    #[tokio::test]
    async fn grants_exact_role_match_only() {
        let store = Arc::new(MemoryRoleStore::default().with_user(7, Some("admin")));
        let gate = gate_with(store.clone());
        let request = SessionRequest::new(Some(alice_token()), "/dashboard");

        assert!(gate.has_permission(&request, "admin").await);
        assert!(!gate.has_permission(&request, "editor").await);
        assert!(!gate.has_permission(&request, "Admin").await);
        assert!(!gate.has_permission(&request, "admin ").await);
        assert_eq!(store.lookups(), 4);
    }

    #[tokio::test]
    async fn missing_cookie_denies_without_lookup() {
        let store = Arc::new(MemoryRoleStore::default().with_user(7, Some("admin")));
        let gate = gate_with(store.clone());

        let request = SessionRequest::new(None, "/dashboard");
        assert!(!gate.has_permission(&request, "admin").await);

        let request = SessionRequest::new(None, "/login");
        assert!(!gate.has_permission(&request, "admin").await);

        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn rejected_session_denies_without_lookup() {
        let store = Arc::new(MemoryRoleStore::default().with_user(7, Some("admin")));
        let gate = gate_with(store.clone());

        let expired = mint(&json!({"id": 7, "username": "alice", "exp": NOW - 10}));
        let request = SessionRequest::new(Some(expired), "/dashboard");
        assert!(!gate.has_permission(&request, "admin").await);

        let request = SessionRequest::new(Some("garbage".to_string()), "/dashboard");
        assert!(!gate.has_permission(&request, "admin").await);

        // Redirect home from an auth page is not an authenticated identity either.
        let request = SessionRequest::new(Some(alice_token()), "/login");
        assert!(!gate.has_permission(&request, "admin").await);

        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn authorize_surfaces_cookie_purge_for_rejected_session() {
        let store = Arc::new(MemoryRoleStore::default().with_user(7, Some("admin")));
        let gate = gate_with(store.clone());

        let expired = mint(&json!({"id": 7, "username": "alice", "exp": NOW - 10}));
        let request = SessionRequest::new(Some(expired), "/products");
        let denied = gate.authorize(&request, "admin").await;
        assert!(denied.is_err_and(|redirect| redirect.clears_cookie()));

        let request = SessionRequest::new(Some(alice_token()), "/register");
        let denied = gate.authorize(&request, "admin").await;
        assert!(denied.is_err_and(|redirect| !redirect.clears_cookie()));

        let request = SessionRequest::new(None, "/products");
        assert_eq!(gate.authorize(&request, "admin").await, Ok(false));

        let request = SessionRequest::new(Some(alice_token()), "/products");
        assert_eq!(gate.authorize(&request, "admin").await, Ok(true));
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn missing_record_or_role_denies() {
        let store = Arc::new(MemoryRoleStore::default().with_user(7, None));
        let gate = gate_with(store.clone());
        let request = SessionRequest::new(Some(alice_token()), "/dashboard");
        assert!(!gate.has_permission(&request, "admin").await);

        let store = Arc::new(MemoryRoleStore::default().with_user(8, Some("admin")));
        let gate = gate_with(store.clone());
        assert!(!gate.has_permission(&request, "admin").await);
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn store_fault_denies() {
        let store = Arc::new(MemoryRoleStore::failing());
        let gate = gate_with(store.clone());
        let request = SessionRequest::new(Some(alice_token()), "/dashboard");
        assert!(!gate.has_permission(&request, "admin").await);
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn token_role_is_not_trusted() {
        let store = Arc::new(MemoryRoleStore::default().with_user(7, Some("viewer")));
        let gate = gate_with(store);
        let token = mint(&json!({
            "id": 7,
            "username": "alice",
            "role": "admin",
            "exp": NOW + 3600,
        }));
        let request = SessionRequest::new(Some(token), "/dashboard");
        assert!(!gate.has_permission(&request, "admin").await);
        assert!(gate.has_permission(&request, "viewer").await);
    }
}
