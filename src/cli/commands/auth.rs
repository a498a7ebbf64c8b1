use crate::api::{AuthConfig, Environment};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_ENVIRONMENT: &str = "environment";

/// Build the token configuration from matches.
///
/// # Errors
/// Returns an error if the signing secret is missing or empty.
pub fn parse(matches: &ArgMatches) -> anyhow::Result<AuthConfig> {
    let secret = matches
        .get_one::<String>(ARG_TOKEN_SECRET)
        .cloned()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_TOKEN_SECRET}"))?;
    let ttl_seconds = matches
        .get_one::<u64>(ARG_TOKEN_TTL_SECONDS)
        .copied()
        .unwrap_or(3600);
    let environment = matches
        .get_one::<String>(ARG_ENVIRONMENT)
        .map(|value| value.parse::<Environment>())
        .transpose()
        .map_err(|err| anyhow::anyhow!(err))?
        .unwrap_or_default();

    Ok(AuthConfig::new(SecretString::from(secret))
        .with_token_ttl_seconds(ttl_seconds)
        .with_environment(environment))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long("token-secret")
                .help("Secret used to sign the token cookie (HS256)")
                .env("FOODSHARE_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long("token-ttl-seconds")
                .help("Token and cookie lifetime in seconds")
                .env("FOODSHARE_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long("environment")
                .help("Deployment environment; production sends Secure, SameSite=None cookies")
                .env("FOODSHARE_ENV")
                .default_value("development")
                .value_parser(["development", "production"]),
        )
}
