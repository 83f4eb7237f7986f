//! Category endpoints (`/categorias`).
//!
//! A category is a named grouping of athletes (for example `Scale` or `RX`).
//! Names are unique; the database constraint `categorias_nome_key` decides
//! concurrent creates and the loser receives the conflict response.
//! Handlers parse and validate inputs, `storage` owns the SQL.

pub(crate) mod handlers;
mod storage;
pub(crate) mod types;
