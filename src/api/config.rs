//! Runtime knobs shared by every resource handler.

use axum::http::StatusCode;

use super::error::ApiError;

/// Status returned when an insert loses a uniqueness race.
///
/// `SeeOther` (303) is what existing clients of this API observe; `Conflict`
/// (409) is the conventional choice and can be enabled per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictStatus {
    #[default]
    SeeOther,
    Conflict,
}

impl ConflictStatus {
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::SeeOther => StatusCode::SEE_OTHER,
            Self::Conflict => StatusCode::CONFLICT,
        }
    }

    /// Parses the numeric status accepted on the command line.
    ///
    /// # Errors
    /// Returns an error message for anything other than `303` or `409`.
    pub fn from_code(code: u16) -> Result<Self, String> {
        match code {
            303 => Ok(Self::SeeOther),
            409 => Ok(Self::Conflict),
            other => Err(format!(
                "unsupported conflict status {other}, expected 303 or 409"
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    conflict_status: ConflictStatus,
    cors_origin: Option<String>,
}

impl ApiConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_conflict_status(mut self, status: ConflictStatus) -> Self {
        self.conflict_status = status;
        self
    }

    #[must_use]
    pub fn with_cors_origin(mut self, origin: Option<String>) -> Self {
        self.cors_origin = origin;
        self
    }

    #[must_use]
    pub fn conflict_status(&self) -> ConflictStatus {
        self.conflict_status
    }

    #[must_use]
    pub fn cors_origin(&self) -> Option<&str> {
        self.cors_origin.as_deref()
    }

    /// Builds the conflict error for `message` using the configured status.
    pub(crate) fn conflict(&self, message: String) -> ApiError {
        ApiError::Conflict {
            status: self.conflict_status.status_code(),
            message,
        }
    }
}
