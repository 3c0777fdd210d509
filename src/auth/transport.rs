//! Cookie and header plumbing between HTTP requests and the verifier.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue, REFERER},
};

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "token";

/// Name and attributes of the session cookie.
#[derive(Clone, Debug)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_COOKIE_NAME)
    }
}

impl SessionCookie {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: false,
        }
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the session token from the request cookies.
    ///
    /// An empty value counts as no cookie at all.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let Some((key, val)) = pair.trim().split_once('=') else {
                    continue;
                };
                if key.trim() == self.name {
                    let val = val.trim();
                    return (!val.is_empty()).then(|| val.to_string());
                }
            }
        }
        None
    }

    /// `Set-Cookie` value that deletes the session cookie.
    ///
    /// # Errors
    /// Returns an error if the configured cookie name is not a valid header value.
    pub fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// What the verifier needs from a request: the raw session token, if any,
/// and the referring page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionRequest {
    token: Option<String>,
    referer: String,
}

impl SessionRequest {
    #[must_use]
    pub fn new(token: Option<String>, referer: impl Into<String>) -> Self {
        Self {
            token: token.filter(|token| !token.is_empty()),
            referer: referer.into(),
        }
    }

    /// Capture the session cookie and `Referer` header; a missing or
    /// non-UTF-8 referer reads as an empty string.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, cookie: &SessionCookie) -> Self {
        let referer = headers
            .get(REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        Self::new(cookie.read(headers), referer)
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn referer(&self) -> &str {
        &self.referer
    }
}
