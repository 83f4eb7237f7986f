//! # Workout API
//!
//! `workout-api` manages the reference data of a workout tracker: exercise
//! categories, training centers and the athletes that train there.
//!
//! ## Resources
//!
//! Every resource exposes the same three operations:
//!
//! - `POST /<resource>` creates a row with a server-generated UUID and returns `201`.
//! - `GET /<resource>?page=&size=` returns a page envelope (`items`, `total`, `page`, `size`, `pages`).
//! - `GET /<resource>/{id}` returns one row or `404`.
//!
//! Names (`nome`) of categories and training centers, and the `cpf` of athletes,
//! are unique. Uniqueness is enforced by the database; a losing insert surfaces
//! as a conflict carrying the offending value. The conflict status defaults to
//! `303 See Other` and can be switched to `409 Conflict` with `--conflict-status`.
//!
//! ## Errors
//!
//! Error bodies are JSON objects with a `detail` field: a string for single
//! messages, a list of `{loc, msg, type}` entries for validation failures (`422`).
//! Database failures are logged and returned as a generic `500`.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
