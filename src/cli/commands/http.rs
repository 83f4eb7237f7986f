use crate::api::config::ConflictStatus;
use clap::{Arg, Command, builder::ValueParser};

pub const ARG_PORT: &str = "port";
pub const ARG_CONFLICT_STATUS: &str = "conflict-status";
pub const ARG_CORS_ORIGIN: &str = "cors-origin";

#[must_use]
pub fn validator_conflict_status() -> ValueParser {
    ValueParser::from(|value: &str| -> std::result::Result<ConflictStatus, String> {
        let code = value
            .parse::<u16>()
            .map_err(|_| format!("invalid status code: {value}"))?;
        ConflictStatus::from_code(code)
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("WORKOUT_API_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_CONFLICT_STATUS)
                .long("conflict-status")
                .help("Status returned when a unique name or cpf is already taken (303 or 409)")
                .default_value("303")
                .env("WORKOUT_API_CONFLICT_STATUS")
                .value_parser(validator_conflict_status()),
        )
        .arg(
            Arg::new(ARG_CORS_ORIGIN)
                .long("cors-origin")
                .help("Allowed browser origin, e.g. https://app.example.com (CORS disabled when unset)")
                .env("WORKOUT_API_CORS_ORIGIN"),
        )
}
