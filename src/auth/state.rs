//! Auth configuration and the shared state handed to HTTP handlers.

use axum::http::HeaderMap;
use std::sync::Arc;

use super::{
    gate::AuthorizationGate,
    store::RoleStore,
    transport::{DEFAULT_SESSION_COOKIE_NAME, SessionCookie, SessionRequest},
    verifier::SessionVerifier,
};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_cookie_name: String,
    session_cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            session_cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: String) -> Self {
        self.session_cookie_name = name;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub fn session_cookie(&self) -> SessionCookie {
        SessionCookie::new(self.session_cookie_name.clone())
            .with_secure(self.session_cookie_secure)
    }
}

#[derive(Debug)]
pub struct AuthState {
    cookie: SessionCookie,
    verifier: Arc<SessionVerifier>,
    gate: AuthorizationGate,
}

impl AuthState {
    #[must_use]
    pub fn new(config: &AuthConfig, verifier: SessionVerifier, store: Arc<dyn RoleStore>) -> Self {
        let verifier = Arc::new(verifier);
        Self {
            cookie: config.session_cookie(),
            gate: AuthorizationGate::new(verifier.clone(), store),
            verifier,
        }
    }

    #[must_use]
    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    #[must_use]
    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Extract the verifier inputs from request headers.
    #[must_use]
    pub fn request(&self, headers: &HeaderMap) -> SessionRequest {
        SessionRequest::from_headers(headers, &self.cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{MemoryRoleStore, verifier};
    use axum::http::HeaderValue;

    #[test]
    fn config_defaults_to_token_cookie() {
        let config = AuthConfig::new();
        assert_eq!(config.session_cookie_name(), "token");
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn state_reads_configured_cookie() {
        let config = AuthConfig::new()
            .with_session_cookie_name("stockroom_session".to_string())
            .with_session_cookie_secure(true);
        let state = AuthState::new(&config, verifier(), Arc::new(MemoryRoleStore::default()));

        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("token=ignored; stockroom_session=abc"),
        );
        headers.insert("referer", HeaderValue::from_static("/orders"));

        let request = state.request(&headers);
        assert_eq!(request.token(), Some("abc"));
        assert_eq!(request.referer(), "/orders");
        assert_eq!(state.cookie().name(), "stockroom_session");
    }
}
