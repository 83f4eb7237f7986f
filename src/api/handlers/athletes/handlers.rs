use axum::{
    Json,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    storage::{fetch_athlete, fetch_athletes, insert_athlete},
    types::{AthleteFilter, AthleteRequest, AthleteResponse},
};
use crate::api::{
    config::ApiConfig,
    error::{ApiError, ErrorDetail, StorageError, ValidationDetail},
    pagination::{Page, PageParams},
    validation::{path_id, validated_body, validated_query},
};

#[utoipa::path(
    post,
    path = "/atletas",
    request_body = AthleteRequest,
    responses(
        (status = 201, description = "Athlete created.", body = AthleteResponse),
        (status = 303, description = "An athlete with this cpf already exists (409 when configured).", body = ErrorDetail),
        (status = 400, description = "The referenced category or training center does not exist.", body = ErrorDetail),
        (status = 422, description = "Invalid input.", body = ValidationDetail),
        (status = 500, description = "The athlete could not be stored.", body = ErrorDetail),
    ),
    tag = "atletas"
)]
/// Creates an athlete linked to an existing category and training center.
#[instrument(skip_all)]
pub async fn create_athlete(
    pool: Extension<PgPool>,
    config: Extension<Arc<ApiConfig>>,
    payload: Result<Json<AthleteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AthleteResponse>), ApiError> {
    let request = validated_body(payload)?;
    let id = Uuid::new_v4();
    debug!("creating athlete {id}");

    match insert_athlete(&pool, id, &request).await {
        Ok(athlete) => Ok((StatusCode::CREATED, Json(athlete))),
        Err(StorageError::UniqueViolation { .. }) => Err(config.conflict(format!(
            "An athlete is already registered with the cpf: {}",
            request.cpf
        ))),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    get,
    path = "/atletas",
    params(PageParams, AthleteFilter),
    responses(
        (status = 200, description = "One page of athletes.", body = Page<AthleteResponse>),
        (status = 422, description = "Invalid page parameters or filters.", body = ValidationDetail),
        (status = 500, description = "Database failure.", body = ErrorDetail),
    ),
    tag = "atletas"
)]
/// Lists athletes, optionally filtered by exact `nome` or `cpf`.
#[instrument(skip_all)]
pub async fn list_athletes(
    pool: Extension<PgPool>,
    params: Result<Query<PageParams>, QueryRejection>,
    filter: Result<Query<AthleteFilter>, QueryRejection>,
) -> Result<Json<Page<AthleteResponse>>, ApiError> {
    let params = validated_query(params)?;
    let filter = validated_query(filter)?;
    Ok(Json(fetch_athletes(&pool, params, &filter).await?))
}

#[utoipa::path(
    get,
    path = "/atletas/{id}",
    params(("id" = Uuid, Path, description = "Athlete id")),
    responses(
        (status = 200, description = "Athlete detail.", body = AthleteResponse),
        (status = 404, description = "Athlete not found.", body = ErrorDetail),
        (status = 422, description = "Malformed id.", body = ValidationDetail),
    ),
    tag = "atletas"
)]
#[instrument(skip_all)]
pub async fn get_athlete(
    pool: Extension<PgPool>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AthleteResponse>, ApiError> {
    let id = path_id(id, "id")?;

    fetch_athlete(&pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Athlete not found for id: {id}")))
}
