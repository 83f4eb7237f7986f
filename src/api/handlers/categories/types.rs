//! Request/response types for the categories API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::validation::{Normalize, reject_nul};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CategoryRequest {
    /// Category name, unique across categories.
    #[schema(example = "Scale", max_length = 10)]
    #[validate(
        length(min = 1, max = 10, message = "nome must have between 1 and 10 characters"),
        custom(function = "reject_nul")
    )]
    pub nome: String,
}

impl Normalize for CategoryRequest {
    fn normalize(self) -> Self {
        Self {
            nome: self.nome.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub nome: String,
}

impl CategoryResponse {
    /// Pairs a freshly generated id with a validated request.
    #[must_use]
    pub fn from_request(id: Uuid, request: CategoryRequest) -> Self {
        Self {
            id,
            nome: request.nome,
        }
    }
}
