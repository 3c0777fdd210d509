//! Session endpoint: runs the verifier against the caller's cookie and referer.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::auth::{AuthState, AuthUser, Redirect, SessionCookie, Verification};

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is valid", body = AuthUser),
        (status = 204, description = "No session while on the login or register page"),
        (status = 307, description = "Redirect to the login or home page; may clear the session cookie")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let request = auth_state.request(&headers);
    match auth_state
        .verifier()
        .verify(request.token(), request.referer())
    {
        Verification::Authenticated(user) => (StatusCode::OK, Json(user)).into_response(),
        Verification::Unauthenticated => StatusCode::NO_CONTENT.into_response(),
        Verification::Redirect(redirect) => redirect_response(redirect, auth_state.cookie()),
    }
}

/// Turn a terminal redirect into `Location` plus, when required, a cookie purge.
pub(crate) fn redirect_response(redirect: Redirect, cookie: &SessionCookie) -> Response {
    let mut headers = purge_headers(redirect, cookie);
    headers.insert(LOCATION, HeaderValue::from_static(redirect.location()));
    (StatusCode::TEMPORARY_REDIRECT, headers).into_response()
}

/// `Set-Cookie` clearing the session, only when the redirect demands it.
pub(crate) fn purge_headers(redirect: Redirect, cookie: &SessionCookie) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if redirect.clears_cookie() {
        match cookie.clear() {
            Ok(value) => {
                headers.insert(SET_COOKIE, value);
            }
            Err(err) => error!("Failed to build session cookie: {err}"),
        }
    }
    headers
}
