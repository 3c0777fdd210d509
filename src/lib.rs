//! # Stockroom (session gate)
//!
//! `stockroom` decides, for every request reaching the Stockroom inventory
//! dashboard, whether the caller holds a valid session and whether that
//! session's role satisfies a named permission.
//!
//! ## Session verification
//!
//! Sessions are HMAC-signed JWTs carried in the `token` cookie. A token is
//! accepted only when its signature verifies against the process-wide secret,
//! its `exp` lies strictly in the future, and its claims have the expected
//! shape (`id` integer, `username` string).
//!
//! Verification is coupled to navigation: callers without a session are sent
//! to `/login`, callers with a session that land on `/login` or `/register`
//! are sent to `/`. Redirects are returned as a terminal variant of
//! [`auth::Verification`], never raised.
//!
//! ## Authorization
//!
//! [`auth::AuthorizationGate`] re-reads the caller's role from the user store
//! on every check and compares the role name to the permission by exact
//! string equality. Every fault degrades to "denied".

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
