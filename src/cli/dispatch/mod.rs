use crate::{
    api::{PoolSettings, config::ConflictStatus},
    cli::{
        actions::{Action, server::Args},
        commands::{database, http},
    },
};
use anyhow::{Context, Result, bail};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(http::ARG_PORT)
        .copied()
        .unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(database::ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let defaults = PoolSettings::default();
    let pool = PoolSettings {
        min_connections: matches
            .get_one::<u32>(database::ARG_DB_MIN_CONNECTIONS)
            .copied()
            .unwrap_or(defaults.min_connections),
        max_connections: matches
            .get_one::<u32>(database::ARG_DB_MAX_CONNECTIONS)
            .copied()
            .unwrap_or(defaults.max_connections),
    };
    if pool.min_connections > pool.max_connections {
        bail!(
            "--db-min-connections ({}) cannot exceed --db-max-connections ({})",
            pool.min_connections,
            pool.max_connections
        );
    }

    let conflict_status = matches
        .get_one::<ConflictStatus>(http::ARG_CONFLICT_STATUS)
        .copied()
        .unwrap_or_default();
    let cors_origin = matches.get_one::<String>(http::ARG_CORS_ORIGIN).cloned();

    Ok(Action::Server(Args {
        port,
        dsn: SecretString::from(dsn),
        pool,
        conflict_status,
        cors_origin,
    }))
}
