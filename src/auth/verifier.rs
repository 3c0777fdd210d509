//! Session verification state machine.
//!
//! Flow Overview:
//! 1) No token outside the auth pages: redirect to login.
//! 2) A token on an auth page: redirect home, the caller is already signed in.
//! 3) No token on an auth page: unauthenticated, let the page render.
//! 4) Otherwise check signature, expiry and claim shape; any failure purges the
//!    cookie and redirects to login.

use jsonwebtoken::{Algorithm, Validation, decode};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    claims::{self, AuthUser, Claims},
    clock::{Clock, SystemClock},
    error::VerifyError,
    secret::SessionSecret,
};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

const AUTH_PAGE_MARKERS: [&str; 2] = ["/login", "/register"];

/// Whether the referring page is the login or registration page.
#[must_use]
pub fn is_auth_page(referer: &str) -> bool {
    AUTH_PAGE_MARKERS
        .iter()
        .any(|marker| referer.contains(marker))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    Home,
}

impl RedirectTarget {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Home => HOME_PATH,
        }
    }
}

/// Terminal navigation instruction. Once returned, nothing else in the
/// request may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    target: RedirectTarget,
    clear_cookie: bool,
}

impl Redirect {
    const fn to(target: RedirectTarget) -> Self {
        Self {
            target,
            clear_cookie: false,
        }
    }

    const fn purging_session(target: RedirectTarget) -> Self {
        Self {
            target,
            clear_cookie: true,
        }
    }

    #[must_use]
    pub const fn target(self) -> RedirectTarget {
        self.target
    }

    #[must_use]
    pub const fn location(self) -> &'static str {
        self.target.path()
    }

    /// The session cookie must be deleted before redirecting.
    #[must_use]
    pub const fn clears_cookie(self) -> bool {
        self.clear_cookie
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    Authenticated(AuthUser),
    Unauthenticated,
    Redirect(Redirect),
}

impl Verification {
    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Unauthenticated | Self::Redirect(_) => None,
        }
    }
}

pub struct SessionVerifier {
    secret: SessionSecret,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("secret", &self.secret)
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl SessionVerifier {
    #[must_use]
    pub fn new(secret: SessionSecret) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(secret: SessionSecret, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret,
            validation: token_validation(),
            clock,
        }
    }

    /// Classify a request from its session token and referer hint.
    pub fn verify(&self, token: Option<&str>, referer: &str) -> Verification {
        let token = token.filter(|token| !token.is_empty());
        let on_auth_page = is_auth_page(referer);

        match (token, on_auth_page) {
            (None, false) => {
                debug!("No session token, redirecting to login");
                Verification::Redirect(Redirect::to(RedirectTarget::Login))
            }
            (Some(_), true) => {
                debug!("Session token on an auth page, redirecting home");
                Verification::Redirect(Redirect::to(RedirectTarget::Home))
            }
            (None, true) => Verification::Unauthenticated,
            (Some(token), false) => match self.decode(token) {
                Ok(user) => Verification::Authenticated(user),
                Err(err) => {
                    warn!("Rejecting session token: {err}");
                    Verification::Redirect(Redirect::purging_session(RedirectTarget::Login))
                }
            },
        }
    }

    /// Verify a token and project its claims, without any navigation policy.
    ///
    /// # Errors
    /// Returns a [`VerifyError`] when the signature, expiry, or claim shape is invalid.
    pub fn decode(&self, token: &str) -> Result<AuthUser, VerifyError> {
        let data = decode::<Claims>(token, self.secret.decoding_key(), &self.validation)?;
        let claims = data.claims;
        let now = self.clock.now_seconds();

        let exp = claims::expires_at(&claims).ok_or(VerifyError::MissingExpiry)?;
        if exp <= now {
            return Err(VerifyError::Expired);
        }
        if claims::not_before(&claims).is_some_and(|nbf| nbf > now) {
            return Err(VerifyError::NotYetValid);
        }

        AuthUser::from_claims(&claims)
    }
}

/// Signature-only validation; time-based claims are checked against the
/// injected clock instead of the library's wall clock.
fn token_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation
}
