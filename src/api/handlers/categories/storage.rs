//! SQL for the `categorias` table.

use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::types::CategoryResponse;
use crate::api::{
    error::StorageError,
    pagination::{Page, PageParams, total_from_count},
};

/// Persisted shape of a category. `created_at` only drives ordering and is not exposed.
#[derive(Debug, FromRow)]
pub(super) struct CategoryRow {
    id: Uuid,
    nome: String,
}

impl From<CategoryRow> for CategoryResponse {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            nome: row.nome,
        }
    }
}

/// Inserts a category in its own transaction.
/// A duplicate `nome` surfaces as `StorageError::UniqueViolation`; the transaction is rolled back on drop.
#[instrument(skip(pool, category), fields(category.id = %category.id))]
pub(super) async fn insert_category(
    pool: &PgPool,
    category: &CategoryResponse,
) -> Result<(), StorageError> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO categorias (id, nome) VALUES ($1, $2)")
        .bind(category.id)
        .bind(&category.nome)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Returns one page of categories in insertion order plus the total row count.
#[instrument(skip(pool))]
pub(super) async fn fetch_categories(
    pool: &PgPool,
    params: PageParams,
) -> Result<Page<CategoryResponse>, StorageError> {
    let mut conn = pool.acquire().await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categorias")
        .fetch_one(&mut *conn)
        .await?;

    let rows: Vec<CategoryRow> = sqlx::query_as(
        r"
        SELECT id, nome
        FROM categorias
        ORDER BY created_at, id
        LIMIT $1 OFFSET $2
        ",
    )
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(&mut *conn)
    .await?;

    Ok(Page::new(rows, total_from_count(total), params).map(CategoryResponse::from))
}

#[instrument(skip(pool))]
pub(super) async fn fetch_category(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<CategoryResponse>, StorageError> {
    let row: Option<CategoryRow> = sqlx::query_as("SELECT id, nome FROM categorias WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(CategoryResponse::from))
}
