use thiserror::Error;

/// Errors surfaced by stores, repositories and services.
///
/// The first three variants are the domain taxonomy callers are expected to
/// map to client-facing responses; `Db` is opaque infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField { field, reason: reason.into() }
    }

    pub fn not_found(entity: &str) -> Self { Self::NotFound(entity.to_string()) }

    pub fn already_exists(entity: &str) -> Self { Self::AlreadyExists(entity.to_string()) }

    /// Short machine-readable label, used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidField { .. } => "invalid_field",
            ServiceError::AlreadyExists(_) => "already_exists",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Db(_) => "db",
        }
    }
}
