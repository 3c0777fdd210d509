//! Shared fixtures for auth tests: token minting and an in-memory role store.
#![allow(clippy::expect_used)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::SecretString;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{
    clock::FixedClock,
    secret::SessionSecret,
    store::{RoleStore, UserRole},
    verifier::SessionVerifier,
};

pub(crate) const NOW: i64 = 1_700_000_000;
pub(crate) const TEST_SECRET: &str = "stockroom-test-secret";

pub(crate) fn mint(claims: &Value) -> String {
    mint_with(Algorithm::HS256, TEST_SECRET, claims)
}

pub(crate) fn mint_with(alg: Algorithm, secret: &str, claims: &Value) -> String {
    encode(
        &Header::new(alg),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("test claims must encode")
}

pub(crate) fn verifier() -> SessionVerifier {
    let secret = SessionSecret::new(&SecretString::from(TEST_SECRET.to_string()))
        .expect("test secret must be valid");
    SessionVerifier::with_clock(secret, Arc::new(FixedClock::at(NOW)))
}

/// Role store backed by a map; counts lookups and can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct MemoryRoleStore {
    users: HashMap<i64, Option<String>>,
    fail: bool,
    lookups: AtomicUsize,
}

impl MemoryRoleStore {
    pub(crate) fn with_user(mut self, id: i64, role: Option<&str>) -> Self {
        self.users.insert(id, role.map(str::to_string));
        self
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn lookup_role(&self, user_id: i64) -> Result<Option<UserRole>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.users.get(&user_id).map(|role| UserRole {
            role_name: role.clone(),
        }))
    }
}
