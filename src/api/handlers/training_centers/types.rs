//! Request/response types for the training centers API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::validation::{Normalize, reject_nul};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct TrainingCenterRequest {
    /// Training center name, unique across training centers.
    #[schema(example = "CT King", max_length = 20)]
    #[validate(
        length(min = 1, max = 20, message = "nome must have between 1 and 20 characters"),
        custom(function = "reject_nul")
    )]
    pub nome: String,
    /// Street address.
    #[schema(example = "Rua X, Q02", max_length = 60)]
    #[validate(
        length(min = 1, max = 60, message = "endereco must have between 1 and 60 characters"),
        custom(function = "reject_nul")
    )]
    pub endereco: String,
    /// Owner name.
    #[schema(example = "Marcos", max_length = 30)]
    #[validate(
        length(min = 1, max = 30, message = "proprietario must have between 1 and 30 characters"),
        custom(function = "reject_nul")
    )]
    pub proprietario: String,
}

impl Normalize for TrainingCenterRequest {
    fn normalize(self) -> Self {
        Self {
            nome: self.nome.trim().to_string(),
            endereco: self.endereco.trim().to_string(),
            proprietario: self.proprietario.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrainingCenterResponse {
    pub id: Uuid,
    pub nome: String,
    pub endereco: String,
    pub proprietario: String,
}

impl TrainingCenterResponse {
    #[must_use]
    pub fn from_request(id: Uuid, request: TrainingCenterRequest) -> Self {
        Self {
            id,
            nome: request.nome,
            endereco: request.endereco,
            proprietario: request.proprietario,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(nome: &str, endereco: &str, proprietario: &str) -> TrainingCenterRequest {
        TrainingCenterRequest {
            nome: nome.to_string(),
            endereco: endereco.to_string(),
            proprietario: proprietario.to_string(),
        }
    }

    #[test]
    fn valid_request_passes_after_trimming() {
        let request = request(" CT King ", "Rua X, Q02", "Marcos ").normalize();
        assert_eq!(request.nome, "CT King");
        assert_eq!(request.proprietario, "Marcos");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn every_field_is_bounded() {
        let errors = request(&"n".repeat(21), "", &"p".repeat(31)).validate().err();
        assert!(errors.is_some());
        if let Some(errors) = errors {
            let fields = errors.field_errors();
            assert!(fields.contains_key("nome"));
            assert!(fields.contains_key("endereco"));
            assert!(fields.contains_key("proprietario"));
        }
    }

    #[test]
    fn response_copies_request_fields() {
        let id = Uuid::new_v4();
        let response = TrainingCenterResponse::from_request(id, request("CT", "Rua", "Ana"));
        assert_eq!(response.id, id);
        assert_eq!(response.nome, "CT");
        assert_eq!(response.endereco, "Rua");
        assert_eq!(response.proprietario, "Ana");
    }
}
