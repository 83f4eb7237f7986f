//! SQL for the `centros_treinamento` table.

use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::types::TrainingCenterResponse;
use crate::api::{
    error::StorageError,
    pagination::{Page, PageParams, total_from_count},
};

#[derive(Debug, FromRow)]
pub(super) struct TrainingCenterRow {
    id: Uuid,
    nome: String,
    endereco: String,
    proprietario: String,
}

impl From<TrainingCenterRow> for TrainingCenterResponse {
    fn from(row: TrainingCenterRow) -> Self {
        Self {
            id: row.id,
            nome: row.nome,
            endereco: row.endereco,
            proprietario: row.proprietario,
        }
    }
}

/// Inserts a training center in its own transaction.
/// Duplicate names map to `StorageError::UniqueViolation`.
#[instrument(skip(pool, center), fields(training_center.id = %center.id))]
pub(super) async fn insert_training_center(
    pool: &PgPool,
    center: &TrainingCenterResponse,
) -> Result<(), StorageError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
        INSERT INTO centros_treinamento (id, nome, endereco, proprietario)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(center.id)
    .bind(&center.nome)
    .bind(&center.endereco)
    .bind(&center.proprietario)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

#[instrument(skip(pool))]
pub(super) async fn fetch_training_centers(
    pool: &PgPool,
    params: PageParams,
) -> Result<Page<TrainingCenterResponse>, StorageError> {
    let mut conn = pool.acquire().await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM centros_treinamento")
        .fetch_one(&mut *conn)
        .await?;

    let rows: Vec<TrainingCenterRow> = sqlx::query_as(
        r"
        SELECT id, nome, endereco, proprietario
        FROM centros_treinamento
        ORDER BY created_at, id
        LIMIT $1 OFFSET $2
        ",
    )
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(&mut *conn)
    .await?;

    Ok(Page::new(rows, total_from_count(total), params).map(TrainingCenterResponse::from))
}

#[instrument(skip(pool))]
pub(super) async fn fetch_training_center(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<TrainingCenterResponse>, StorageError> {
    let row: Option<TrainingCenterRow> = sqlx::query_as(
        r"
        SELECT id, nome, endereco, proprietario
        FROM centros_treinamento
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(TrainingCenterResponse::from))
}
