//! SQL for the `atletas` table.
//!
//! Athletes reference a category and a training center by name. Both names are
//! resolved to ids inside the insert transaction so a concurrent insert cannot
//! observe a half-linked row.

use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{Instrument, info_span, instrument};
use uuid::Uuid;

use super::types::{
    AthleteFilter, AthleteRequest, AthleteResponse, CategoryName, TrainingCenterName,
};
use crate::api::{
    error::StorageError,
    pagination::{Page, PageParams, total_from_count},
};

#[derive(Debug, FromRow)]
pub(super) struct AthleteRow {
    id: Uuid,
    nome: String,
    cpf: String,
    idade: i32,
    peso: f64,
    altura: f64,
    sexo: String,
    categoria: String,
    centro_treinamento: String,
    created_at: String,
}

impl From<AthleteRow> for AthleteResponse {
    fn from(row: AthleteRow) -> Self {
        Self {
            id: row.id,
            nome: row.nome,
            cpf: row.cpf,
            idade: row.idade,
            peso: row.peso,
            altura: row.altura,
            sexo: row.sexo,
            categoria: CategoryName { nome: row.categoria },
            centro_treinamento: TrainingCenterName {
                nome: row.centro_treinamento,
            },
            created_at: row.created_at,
        }
    }
}

const SELECT_ATHLETE: &str = r#"
    SELECT
        a.id,
        a.nome,
        a.cpf,
        a.idade,
        a.peso,
        a.altura,
        a.sexo,
        c.nome AS categoria,
        ct.nome AS centro_treinamento,
        to_char(a.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
    FROM atletas a
    JOIN categorias c ON c.id = a.categoria_id
    JOIN centros_treinamento ct ON ct.id = a.centro_treinamento_id
"#;

const CATEGORY_ID_BY_NAME: &str = "SELECT id FROM categorias WHERE nome = $1";
const TRAINING_CENTER_ID_BY_NAME: &str = "SELECT id FROM centros_treinamento WHERE nome = $1";

async fn resolve_id(
    tx: &mut Transaction<'_, Postgres>,
    sql: &'static str,
    nome: &str,
) -> Result<Option<Uuid>, StorageError> {
    let id = sqlx::query_scalar(sql)
        .bind(nome)
        .fetch_optional(&mut **tx)
        .instrument(info_span!(
            "db.query",
            db.system = "postgresql",
            db.statement = sql
        ))
        .await?;
    Ok(id)
}

/// Resolves the athlete's references and inserts it, returning the stored row.
///
/// A missing category or training center yields `StorageError::MissingReference`;
/// a duplicate cpf yields `StorageError::UniqueViolation`.
#[instrument(skip(pool, request), fields(athlete.id = %id))]
pub(super) async fn insert_athlete(
    pool: &PgPool,
    id: Uuid,
    request: &AthleteRequest,
) -> Result<AthleteResponse, StorageError> {
    let mut tx = pool.begin().await?;

    let Some(categoria_id) =
        resolve_id(&mut tx, CATEGORY_ID_BY_NAME, &request.categoria.nome).await?
    else {
        return Err(StorageError::MissingReference(format!(
            "Category not found: {}",
            request.categoria.nome
        )));
    };

    let Some(centro_id) = resolve_id(
        &mut tx,
        TRAINING_CENTER_ID_BY_NAME,
        &request.centro_treinamento.nome,
    )
    .await?
    else {
        return Err(StorageError::MissingReference(format!(
            "Training center not found: {}",
            request.centro_treinamento.nome
        )));
    };

    let created_at: String = sqlx::query_scalar(
        r#"
        INSERT INTO atletas
            (id, nome, cpf, idade, peso, altura, sexo, categoria_id, centro_treinamento_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"')
        "#,
    )
    .bind(id)
    .bind(&request.nome)
    .bind(&request.cpf)
    .bind(request.idade)
    .bind(request.peso)
    .bind(request.altura)
    .bind(&request.sexo)
    .bind(categoria_id)
    .bind(centro_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(AthleteResponse {
        id,
        nome: request.nome.clone(),
        cpf: request.cpf.clone(),
        idade: request.idade,
        peso: request.peso,
        altura: request.altura,
        sexo: request.sexo.clone(),
        categoria: request.categoria.clone(),
        centro_treinamento: request.centro_treinamento.clone(),
        created_at,
    })
}

#[instrument(
    skip(pool, filter),
    fields(filter.nome = filter.nome.is_some(), filter.cpf = filter.cpf.is_some())
)]
pub(super) async fn fetch_athletes(
    pool: &PgPool,
    params: PageParams,
    filter: &AthleteFilter,
) -> Result<Page<AthleteResponse>, StorageError> {
    let mut conn = pool.acquire().await?;

    let total: i64 = sqlx::query_scalar(
        r"
        SELECT COUNT(*) FROM atletas a
        WHERE ($1::text IS NULL OR a.nome = $1)
          AND ($2::text IS NULL OR a.cpf = $2)
        ",
    )
    .bind(filter.nome.as_deref())
    .bind(filter.cpf.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    let sql = format!(
        "{SELECT_ATHLETE}
        WHERE ($1::text IS NULL OR a.nome = $1)
          AND ($2::text IS NULL OR a.cpf = $2)
        ORDER BY a.created_at, a.id
        LIMIT $3 OFFSET $4"
    );
    let rows: Vec<AthleteRow> = sqlx::query_as(&sql)
        .bind(filter.nome.as_deref())
        .bind(filter.cpf.as_deref())
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&mut *conn)
        .await?;

    Ok(Page::new(rows, total_from_count(total), params).map(AthleteResponse::from))
}

#[instrument(skip(pool))]
pub(super) async fn fetch_athlete(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<AthleteResponse>, StorageError> {
    let sql = format!("{SELECT_ATHLETE} WHERE a.id = $1");
    let row: Option<AthleteRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(AthleteResponse::from))
}
