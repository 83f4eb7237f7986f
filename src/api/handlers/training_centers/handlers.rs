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
use tracing::instrument;
use uuid::Uuid;

use super::{
    storage::{fetch_training_center, fetch_training_centers, insert_training_center},
    types::{TrainingCenterRequest, TrainingCenterResponse},
};
use crate::api::{
    config::ApiConfig,
    error::{ApiError, ErrorDetail, StorageError, ValidationDetail},
    pagination::{Page, PageParams},
    validation::{path_id, validated_body, validated_query},
};

#[utoipa::path(
    post,
    path = "/centros_treinamento",
    request_body = TrainingCenterRequest,
    responses(
        (status = 201, description = "Training center created.", body = TrainingCenterResponse),
        (status = 303, description = "A training center with this name already exists (409 when configured).", body = ErrorDetail),
        (status = 422, description = "Invalid input.", body = ValidationDetail),
        (status = 500, description = "The training center could not be stored.", body = ErrorDetail),
    ),
    tag = "centros_treinamento"
)]
/// Creates a training center with a server-generated id.
#[instrument(skip_all)]
pub async fn create_training_center(
    pool: Extension<PgPool>,
    config: Extension<Arc<ApiConfig>>,
    payload: Result<Json<TrainingCenterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TrainingCenterResponse>), ApiError> {
    let request = validated_body(payload)?;
    let center = TrainingCenterResponse::from_request(Uuid::new_v4(), request);

    match insert_training_center(&pool, &center).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(center))),
        Err(StorageError::UniqueViolation { .. }) => Err(config.conflict(format!(
            "A training center is already registered with the name: {}",
            center.nome
        ))),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    get,
    path = "/centros_treinamento",
    params(PageParams),
    responses(
        (status = 200, description = "One page of training centers.", body = Page<TrainingCenterResponse>),
        (status = 422, description = "Invalid page parameters.", body = ValidationDetail),
        (status = 500, description = "Database failure.", body = ErrorDetail),
    ),
    tag = "centros_treinamento"
)]
#[instrument(skip_all)]
pub async fn list_training_centers(
    pool: Extension<PgPool>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<TrainingCenterResponse>>, ApiError> {
    let params = validated_query(params)?;
    Ok(Json(fetch_training_centers(&pool, params).await?))
}

#[utoipa::path(
    get,
    path = "/centros_treinamento/{id}",
    params(("id" = Uuid, Path, description = "Training center id")),
    responses(
        (status = 200, description = "Training center detail.", body = TrainingCenterResponse),
        (status = 404, description = "Training center not found.", body = ErrorDetail),
        (status = 422, description = "Malformed id.", body = ValidationDetail),
    ),
    tag = "centros_treinamento"
)]
#[instrument(skip_all)]
pub async fn get_training_center(
    pool: Extension<PgPool>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TrainingCenterResponse>, ApiError> {
    let id = path_id(id, "id")?;

    match fetch_training_center(&pool, id).await? {
        Some(center) => Ok(Json(center)),
        None => Err(ApiError::NotFound(format!(
            "Training center not found for id: {id}"
        ))),
    }
}
