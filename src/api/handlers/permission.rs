use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::session::purge_headers;
use crate::auth::AuthState;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PermissionResponse {
    pub permission: String,
    pub granted: bool,
}

#[utoipa::path(
    get,
    path = "/v1/auth/permissions/{permission}",
    params(
        ("permission" = String, Path, description = "Role name the caller must hold")
    ),
    responses(
        (status = 200, description = "Permission decision; denied on any failure. A rejected session cookie is cleared with Set-Cookie", body = PermissionResponse)
    ),
    tag = "auth"
)]
pub async fn permission(
    Path(permission): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let request = auth_state.request(&headers);
    let (granted, headers) = match auth_state.gate().authorize(&request, &permission).await {
        Ok(granted) => (granted, HeaderMap::new()),
        // Denied, but a rejected session cookie is still purged.
        Err(redirect) => (false, purge_headers(redirect, auth_state.cookie())),
    };

    (
        StatusCode::OK,
        headers,
        Json(PermissionResponse {
            permission,
            granted,
        }),
    )
}
