//! Maps validated CLI arguments to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{self, auth, database::Backend};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(5555);

    let cors_origins = matches
        .get_many::<String>(commands::ARG_CORS_ORIGIN)
        .map(|values| {
            values
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(Action::Server(Args {
        port,
        backend: Backend::parse(matches)?,
        auth: auth::parse(matches)?,
        cors_origins,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Environment;
    use secrecy::ExposeSecret;

    const STORE_VARS: [&str; 4] = [
        "FOODSHARE_DSN",
        "FOODSHARE_DB_USER",
        "FOODSHARE_DB_PASS",
        "FOODSHARE_MEMORY",
    ];

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn dsn_or_memory_required() {
        temp_env::with_vars_unset(STORE_VARS, || {
            let result = dispatch(&["foodshare", "--token-secret", "s3cret"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn memory_flag_from_env() {
        temp_env::with_vars(
            [
                ("FOODSHARE_MEMORY", Some("1")),
                ("FOODSHARE_TOKEN_SECRET", Some("s3cret")),
                ("FOODSHARE_ENV", Some("production")),
                ("FOODSHARE_DSN", None),
            ],
            || {
                let action = dispatch(&["foodshare", "-p", "8000"]);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8000);
                    assert!(matches!(args.backend, Backend::Memory));
                    assert_eq!(args.auth.environment(), Environment::Production);
                }
            },
        );
    }

    #[test]
    fn postgres_backend_with_credentials() {
        temp_env::with_vars_unset(STORE_VARS, || {
            let action = dispatch(&[
                "foodshare",
                "--token-secret",
                "s3cret",
                "--dsn",
                "postgres://localhost:5432/foodshare",
                "--db-user",
                "app",
                "--db-pass",
                "hunter2",
                "--token-ttl-seconds",
                "60",
            ]);
            assert!(action.is_ok());
            if let Ok(Action::Server(args)) = action {
                assert_eq!(args.auth.token_ttl_seconds(), 60);
                match args.backend {
                    Backend::Postgres {
                        dsn,
                        user,
                        password,
                    } => {
                        assert_eq!(dsn, "postgres://localhost:5432/foodshare");
                        assert_eq!(user.as_deref(), Some("app"));
                        assert_eq!(
                            password.as_ref().map(|p| p.expose_secret().to_string()),
                            Some("hunter2".to_string())
                        );
                    }
                    Backend::Memory => panic!("expected postgres backend"),
                }
            }
        });
    }
}
