//! Request validation.
//!
//! Inputs pass through two gates before a handler touches the database: serde
//! decoding (surfaced as axum rejections) and a `validator::Validate` pass.
//! Both produce the same typed list of [`FieldError`] so clients see one shape
//! for every `422`.

use axum::{
    Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::error::ApiError;

/// One validation failure: where it happened, what went wrong, and a machine-readable kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    #[must_use]
    pub fn new(loc: Vec<String>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// Cleans user input before validation (for example trimming names).
pub trait Normalize {
    #[must_use]
    fn normalize(self) -> Self;
}

/// Flattens `validator` errors into `FieldError`s rooted at `root` (`body`, `query`, ...).
/// Output is sorted by location so responses are deterministic.
#[must_use]
pub fn field_errors(root: &str, errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(&mut vec![root.to_string()], errors, &mut out);
    out.sort_by(|a, b| a.loc.cmp(&b.loc));
    out
}

fn collect(prefix: &mut Vec<String>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        prefix.push(field.to_string());
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let msg = error
                        .message
                        .as_ref()
                        .map_or_else(|| default_message(&error.code), ToString::to_string);
                    out.push(FieldError::new(prefix.clone(), msg, error.code.to_string()));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(prefix, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    prefix.push(index.to_string());
                    collect(prefix, nested, out);
                    prefix.pop();
                }
            }
        }
        prefix.pop();
    }
}

fn default_message(code: &str) -> String {
    match code {
        "length" => "value has an invalid length".to_string(),
        "range" => "value is out of range".to_string(),
        other => format!("value failed the `{other}` check"),
    }
}

/// Rejects text containing NUL, which Postgres cannot store in `TEXT`/`VARCHAR`.
///
/// # Errors
/// Returns a `nul` validation error when `value` contains `\u{0}`.
pub fn reject_nul(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        Err(ValidationError::new("nul").with_message("value must not contain NUL characters".into()))
    } else {
        Ok(())
    }
}

/// Unwraps a JSON body, normalizes it and runs the validation pass.
///
/// # Errors
/// Returns `ApiError::Validation` for undecodable bodies or failed rules.
pub fn validated_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError>
where
    T: Validate + Normalize,
{
    let Json(payload) = payload.map_err(|rejection| {
        ApiError::Validation(vec![FieldError::new(
            vec!["body".to_string()],
            rejection.body_text(),
            json_rejection_kind(&rejection),
        )])
    })?;

    let payload = payload.normalize();
    payload
        .validate()
        .map_err(|errors| ApiError::Validation(field_errors("body", &errors)))?;
    Ok(payload)
}

/// Unwraps and validates query parameters.
///
/// # Errors
/// Returns `ApiError::Validation` when the query cannot be decoded or breaks a rule.
pub fn validated_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError>
where
    T: Validate,
{
    let Query(params) = query.map_err(|rejection| {
        ApiError::Validation(vec![FieldError::new(
            vec!["query".to_string()],
            rejection.body_text(),
            "query_invalid",
        )])
    })?;

    params
        .validate()
        .map_err(|errors| ApiError::Validation(field_errors("query", &errors)))?;
    Ok(params)
}

/// Unwraps a UUID path segment named `name`.
///
/// # Errors
/// Returns `ApiError::Validation` when the segment is not a well-formed UUID.
pub fn path_id(id: Result<Path<Uuid>, PathRejection>, name: &str) -> Result<Uuid, ApiError> {
    id.map(|Path(id)| id).map_err(|rejection| {
        ApiError::Validation(vec![FieldError::new(
            vec!["path".to_string(), name.to_string()],
            rejection.body_text(),
            "uuid_parsing",
        )])
    })
}

fn json_rejection_kind(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "value_error",
        JsonRejection::JsonSyntaxError(_) => "json_invalid",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        _ => "body_invalid",
    }
}
