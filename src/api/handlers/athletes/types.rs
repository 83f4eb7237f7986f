//! Request/response types for the athletes API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::validation::{Normalize, reject_nul};

const CPF_LEN: usize = 11;

/// Reference to an existing category by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CategoryName {
    #[schema(example = "Scale", max_length = 10)]
    #[validate(
        length(min = 1, max = 10, message = "nome must have between 1 and 10 characters"),
        custom(function = "reject_nul")
    )]
    pub nome: String,
}

/// Reference to an existing training center by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct TrainingCenterName {
    #[schema(example = "CT King", max_length = 20)]
    #[validate(
        length(min = 1, max = 20, message = "nome must have between 1 and 20 characters"),
        custom(function = "reject_nul")
    )]
    pub nome: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct AthleteRequest {
    #[schema(example = "Joao", max_length = 50)]
    #[validate(
        length(min = 1, max = 50, message = "nome must have between 1 and 50 characters"),
        custom(function = "reject_nul")
    )]
    pub nome: String,
    /// Eleven digits, no punctuation.
    #[schema(example = "12345678900", min_length = 11, max_length = 11)]
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: String,
    #[schema(example = 25, minimum = 1, maximum = 150)]
    #[validate(range(min = 1, max = 150, message = "idade must be between 1 and 150"))]
    pub idade: i32,
    /// Weight in kilograms.
    #[schema(example = 75.5)]
    #[validate(range(exclusive_min = 0.0, message = "peso must be greater than 0"))]
    pub peso: f64,
    /// Height in meters.
    #[schema(example = 1.70)]
    #[validate(range(exclusive_min = 0.0, message = "altura must be greater than 0"))]
    pub altura: f64,
    /// `M` or `F`.
    #[schema(example = "M")]
    #[validate(custom(function = "validate_sexo"))]
    pub sexo: String,
    #[validate(nested)]
    pub categoria: CategoryName,
    #[validate(nested)]
    pub centro_treinamento: TrainingCenterName,
}

impl Normalize for AthleteRequest {
    fn normalize(self) -> Self {
        Self {
            nome: self.nome.trim().to_string(),
            cpf: self.cpf.trim().to_string(),
            sexo: self.sexo.trim().to_uppercase(),
            categoria: CategoryName {
                nome: self.categoria.nome.trim().to_string(),
            },
            centro_treinamento: TrainingCenterName {
                nome: self.centro_treinamento.nome.trim().to_string(),
            },
            ..self
        }
    }
}

fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if cpf.len() == CPF_LEN && cpf.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("cpf").with_message("cpf must have exactly 11 digits".into()))
    }
}

fn validate_sexo(sexo: &str) -> Result<(), ValidationError> {
    match sexo {
        "M" | "F" => Ok(()),
        _ => Err(ValidationError::new("sexo").with_message("sexo must be M or F".into())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AthleteResponse {
    pub id: Uuid,
    pub nome: String,
    pub cpf: String,
    pub idade: i32,
    pub peso: f64,
    pub altura: f64,
    pub sexo: String,
    pub categoria: CategoryName,
    pub centro_treinamento: TrainingCenterName,
    /// Insert time, UTC, RFC 3339.
    #[schema(example = "2026-01-31T12:00:00Z")]
    pub created_at: String,
}

/// Optional exact-match filters for the athlete list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct AthleteFilter {
    /// Exact athlete name.
    #[validate(custom(function = "reject_nul"))]
    pub nome: Option<String>,
    /// Exact cpf.
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,
}
