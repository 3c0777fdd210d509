//! User-record store seam for role lookups.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;

/// Role projection of a user record. `role_name` is `None` when the user has
/// no role assigned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserRole {
    pub role_name: Option<String>,
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Fetch the role of exactly one user, or `None` if no such user exists.
    async fn lookup_role(&self, user_id: i64) -> Result<Option<UserRole>>;
}

#[derive(Clone, Debug)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn lookup_role(&self, user_id: i64) -> Result<Option<UserRole>> {
        let query = r"
            SELECT r.name AS role_name
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );

        // Returned to the pool when dropped, whichever way this function exits.
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("failed to acquire database connection")?;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .instrument(span)
            .await
            .context("failed to lookup user role")?;

        row.map(|row| {
            row.try_get::<Option<String>, _>("role_name")
                .map(|role_name| UserRole { role_name })
        })
        .transpose()
        .context("failed to decode user role")
    }
}
