use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ACCESS_SECRET: &str = "access-secret";
pub const ARG_REFRESH_SECRET: &str = "refresh-secret";
pub const ARG_ACCESS_TTL_SECONDS: &str = "access-ttl-seconds";
pub const ARG_REFRESH_TTL_SECONDS: &str = "refresh-ttl-seconds";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[derive(Debug)]
pub struct Options {
    pub access_secret: SecretString,
    pub refresh_secret: SecretString,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub frontend_base_url: String,
}

impl Options {
    /// Parse credential arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a secret is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_secret = |id: &str| -> anyhow::Result<SecretString> {
            matches
                .get_one::<String>(id)
                .filter(|v| !v.trim().is_empty())
                .map(|v| SecretString::from(v.as_str()))
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            access_secret: read_secret(ARG_ACCESS_SECRET)?,
            refresh_secret: read_secret(ARG_REFRESH_SECRET)?,
            access_ttl_seconds: matches
                .get_one::<u64>(ARG_ACCESS_TTL_SECONDS)
                .copied()
                .unwrap_or(300),
            refresh_ttl_seconds: matches
                .get_one::<u64>(ARG_REFRESH_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ACCESS_SECRET)
                .long(ARG_ACCESS_SECRET)
                .help("Secret used to sign access credentials")
                .env("DUALPASS_ACCESS_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_REFRESH_SECRET)
                .long(ARG_REFRESH_SECRET)
                .help("Secret used to sign refresh credentials; must differ from the access secret")
                .env("DUALPASS_REFRESH_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TTL_SECONDS)
                .long(ARG_ACCESS_TTL_SECONDS)
                .help("Access credential TTL in seconds")
                .env("DUALPASS_ACCESS_TTL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TTL_SECONDS)
                .long(ARG_REFRESH_TTL_SECONDS)
                .help("Refresh credential TTL in seconds")
                .env("DUALPASS_REFRESH_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL allowed by CORS")
                .env("DUALPASS_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
}
