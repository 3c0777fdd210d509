//! Session verification and role authorization.
//!
//! Flow Overview:
//! 1) [`SessionRequest`] captures the session cookie and the `Referer` hint.
//! 2) [`SessionVerifier`] classifies the request as authenticated,
//!    unauthenticated, or a terminal redirect.
//! 3) [`AuthorizationGate`] resolves the caller's role from the user store and
//!    compares it to the requested permission.
//!
//! Security boundaries: redirects are values the transport must act on, the
//! token's embedded `role` is never used for authorization, and every store
//! fault is a denial.

mod claims;
mod clock;
mod error;
mod gate;
mod secret;
mod state;
mod store;
mod transport;
mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::AuthUser;
pub use clock::{Clock, SystemClock};
pub use error::{SecretError, VerifyError};
pub use gate::AuthorizationGate;
pub use secret::SessionSecret;
pub use state::{AuthConfig, AuthState};
pub use store::{PgRoleStore, RoleStore, UserRole};
pub use transport::{DEFAULT_SESSION_COOKIE_NAME, SessionCookie, SessionRequest};
pub use verifier::{
    HOME_PATH, LOGIN_PATH, Redirect, RedirectTarget, SessionVerifier, Verification, is_auth_page,
};
