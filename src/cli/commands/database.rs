use clap::{builder::BoolishValueParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_DSN: &str = "dsn";
pub const ARG_DB_USER: &str = "db-user";
pub const ARG_DB_PASS: &str = "db-pass";
pub const ARG_MEMORY: &str = "memory";

#[derive(Debug)]
pub enum Backend {
    Memory,
    Postgres {
        dsn: String,
        user: Option<String>,
        password: Option<SecretString>,
    },
}

impl Backend {
    /// Pick the store backend from matches.
    ///
    /// # Errors
    /// Returns an error if neither a DSN nor the in-memory store was requested.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        if matches.get_flag(ARG_MEMORY) {
            return Ok(Self::Memory);
        }

        // Helper to filter empty strings which clap might pass through if env vars are set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let Some(dsn) = get_non_empty(ARG_DSN) else {
            anyhow::bail!("missing required argument: --{ARG_DSN} (or --{ARG_MEMORY})");
        };

        Ok(Self::Postgres {
            dsn,
            user: get_non_empty(ARG_DB_USER),
            password: get_non_empty(ARG_DB_PASS).map(SecretString::from),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .long_help(
                    "PostgreSQL connection string. Username/password may be passed separately with --db-user/--db-pass.",
                )
                .env("FOODSHARE_DSN"),
        )
        .arg(
            Arg::new(ARG_DB_USER)
                .long("db-user")
                .help("Database username, injected into the DSN")
                .env("FOODSHARE_DB_USER"),
        )
        .arg(
            Arg::new(ARG_DB_PASS)
                .long("db-pass")
                .help("Database password, injected into the DSN")
                .env("FOODSHARE_DB_PASS")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_MEMORY)
                .long("memory")
                .help("Keep listings in memory instead of PostgreSQL")
                .env("FOODSHARE_MEMORY")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
}
