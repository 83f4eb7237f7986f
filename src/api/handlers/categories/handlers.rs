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
    storage::{fetch_categories, fetch_category, insert_category},
    types::{CategoryRequest, CategoryResponse},
};
use crate::api::{
    config::ApiConfig,
    error::{ApiError, ErrorDetail, StorageError, ValidationDetail},
    pagination::{Page, PageParams},
    validation::{path_id, validated_body, validated_query},
};

#[utoipa::path(
    post,
    path = "/categorias",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created.", body = CategoryResponse),
        (status = 303, description = "A category with this name already exists (409 when configured).", body = ErrorDetail),
        (status = 422, description = "Invalid input.", body = ValidationDetail),
        (status = 500, description = "The category could not be stored.", body = ErrorDetail),
    ),
    tag = "categorias"
)]
/// Creates a category with a server-generated id.
/// A duplicate `nome` returns the configured conflict status with the name in the message.
#[instrument(skip_all)]
pub async fn create_category(
    pool: Extension<PgPool>,
    config: Extension<Arc<ApiConfig>>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let request = validated_body(payload)?;
    let category = CategoryResponse::from_request(Uuid::new_v4(), request);
    debug!("creating category {}", category.id);

    match insert_category(&pool, &category).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(category))),
        Err(StorageError::UniqueViolation { .. }) => Err(config.conflict(format!(
            "A category is already registered with the name: {}",
            category.nome
        ))),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    get,
    path = "/categorias",
    params(PageParams),
    responses(
        (status = 200, description = "One page of categories.", body = Page<CategoryResponse>),
        (status = 422, description = "Invalid page parameters.", body = ValidationDetail),
        (status = 500, description = "Database failure.", body = ErrorDetail),
    ),
    tag = "categorias"
)]
/// Lists categories one page at a time, oldest first.
#[instrument(skip_all)]
pub async fn list_categories(
    pool: Extension<PgPool>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<CategoryResponse>>, ApiError> {
    let params = validated_query(params)?;
    let page = fetch_categories(&pool, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/categorias/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category detail.", body = CategoryResponse),
        (status = 404, description = "Category not found.", body = ErrorDetail),
        (status = 422, description = "Malformed id.", body = ValidationDetail),
    ),
    tag = "categorias"
)]
/// Fetches one category by id.
#[instrument(skip_all)]
pub async fn get_category(
    pool: Extension<PgPool>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let id = path_id(id, "id")?;

    fetch_category(&pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Category not found for id: {id}")))
}
