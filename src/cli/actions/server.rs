use crate::{
    GIT_COMMIT_HASH,
    api::{
        self, PoolSettings,
        config::{ApiConfig, ConflictStatus},
    },
    cli::telemetry,
};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: SecretString,
    pub pool: PoolSettings,
    pub conflict_status: ConflictStatus,
    pub cors_origin: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let config = ApiConfig::new()
        .with_conflict_status(args.conflict_status)
        .with_cors_origin(args.cors_origin);

    let result = api::new(args.port, &args.dsn, args.pool, config).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("version", format!("{} ({})", env!("CARGO_PKG_VERSION"), short_commit(GIT_COMMIT_HASH))),
        ("listen", format!("tcp:{}", args.port)),
        ("dsn", redact_dsn(args.dsn.expose_secret())),
        (
            "pool",
            format!(
                "min={} max={}",
                args.pool.min_connections, args.pool.max_connections
            ),
        ),
        (
            "conflict_status",
            args.conflict_status.status_code().as_u16().to_string(),
        ),
        (
            "cors_origin",
            args.cors_origin
                .clone()
                .unwrap_or_else(|| "disabled".to_string()),
        ),
    ];
    info!("{}", format_entries("Startup configuration", &entries));
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn format_entries(title: &str, entries: &[(&str, String)]) -> String {
    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    entries
        .iter()
        .fold(format!("{title}:"), |mut message, (key, value)| {
            let padding = " ".repeat(width.saturating_sub(key.len()));
            message.push_str(&format!("\n  {key}:{padding} {value}"));
            message
        })
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
