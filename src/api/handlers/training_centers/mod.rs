//! Training center endpoints (`/centros_treinamento`).
//!
//! Training centers are the gyms athletes belong to. Like categories they are
//! keyed by a unique `nome` (constraint `centros_treinamento_nome_key`) and
//! carry an address and an owner.

pub(crate) mod handlers;
mod storage;
pub(crate) mod types;
