use crate::{
    api,
    auth::{AuthConfig, SessionSecret},
    cli::telemetry,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub session_cookie_name: String,
    pub session_cookie_secure: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the session secret is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let secret = SessionSecret::new(&args.jwt_secret).context("Invalid session secret")?;

    let auth_config = AuthConfig::new()
        .with_session_cookie_name(args.session_cookie_name)
        .with_session_cookie_secure(args.session_cookie_secure);

    debug!("Auth config: {:?}", auth_config);

    let result = api::new(args.port, args.dsn, auth_config, secret).await;

    telemetry::shutdown_tracer();

    result
}
