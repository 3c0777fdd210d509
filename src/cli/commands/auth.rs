use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use secrecy::SecretString;

use crate::auth::DEFAULT_SESSION_COOKIE_NAME;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_SESSION_COOKIE_NAME: &str = "session-cookie-name";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to verify session tokens")
                .env("STOCKROOM_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_NAME)
                .long(ARG_SESSION_COOKIE_NAME)
                .help("Name of the cookie carrying the session token")
                .env("STOCKROOM_SESSION_COOKIE_NAME")
                .default_value(DEFAULT_SESSION_COOKIE_NAME),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the cookie-clearing header as Secure (HTTPS deployments)")
                .env("STOCKROOM_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub session_cookie_name: String,
    pub session_cookie_secure: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if the JWT secret is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;
        let session_cookie_name = matches
            .get_one::<String>(ARG_SESSION_COOKIE_NAME)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string());

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            session_cookie_name,
            session_cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
        })
    }
}
