//! API handlers.
//!
//! One submodule per resource, each split into `types` (wire shapes),
//! `storage` (SQL) and `handlers` (axum glue). `health` reports database
//! reachability for load balancers.

pub mod athletes;
pub mod categories;
pub mod health;
pub mod training_centers;


/// A lazily connecting pool pointed at a closed port, for exercising failure paths.
#[cfg(test)]
pub(crate) fn unreachable_pool() -> sqlx::PgPool {
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
    use std::time::Duration;

    let options = PgConnectOptions::new()
        .host("127.0.0.1")
        .port(1)
        .username("invalid")
        .database("invalid")
        .ssl_mode(PgSslMode::Disable);
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy_with(options)
}
