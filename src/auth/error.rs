use thiserror::Error;

/// Reasons a presented session token is rejected.
///
/// Every variant is handled the same way by the verifier (purge the cookie,
/// redirect to login); the distinction only feeds the logs.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid token signature or format")]
    Signature(#[from] jsonwebtoken::errors::Error),
    #[error("missing expiration")]
    MissingExpiry,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("invalid claim: {0}")]
    MalformedClaim(&'static str),
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("session secret must not be empty")]
    Empty,
}
