//! Athlete endpoints (`/atletas`).
//!
//! Athletes are unique by `cpf` (constraint `atletas_cpf_key`) and point at a
//! category and a training center by name. Unknown names are rejected with
//! `400` before anything is written.

pub(crate) mod handlers;
mod storage;
pub(crate) mod types;
