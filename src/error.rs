//! Typed errors per layer and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("missing reference: {kind} '{id}' (from {from})")]
    MissingReference {
        kind: &'static str,
        id: String,
        from: String,
    },
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    #[error("duplicate column: {table}.{column}")]
    DuplicateColumn { table: String, column: String },
    #[error("invalid reference {table}.{column}: {reason}")]
    InvalidPolicy {
        table: String,
        column: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("migration: {0}")]
    Db(#[from] sqlx::Error),
}

/// Failure reported by a persistence store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected a write: uniqueness, foreign key, not-null or value domain.
    #[error("{0}")]
    Constraint(String),
    #[error("database: {0}")]
    Db(sqlx::Error),
    #[error("row codec: {0}")]
    Codec(String),
    #[error("unknown column {table}.{column}")]
    UnknownColumn { table: &'static str, column: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match constraint_reason(&e) {
            Some(reason) => StoreError::Constraint(reason),
            None => StoreError::Db(e),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec(e.to_string())
    }
}

/// SQLSTATE class 23 (integrity constraint) and class 22 (data exception) are the payload's fault.
fn constraint_reason(e: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db) = e else {
        return None;
    };
    let code = db.code()?;
    if !(code.starts_with("23") || code.starts_with("22")) {
        return None;
    }
    let detail = db
        .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
        .and_then(|pg| pg.detail())
        .map(|d| format!(" ({})", d))
        .unwrap_or_default();
    Some(format!("{}{}", db.message(), detail))
}

/// The three outcomes a caller of the CRUD engine has to distinguish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ConstraintViolation,
    Infrastructure,
}

#[derive(Error, Debug)]
pub enum CrudError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{entity}: {reason}")]
    ConstraintViolation { entity: &'static str, reason: String },
    #[error("infrastructure: {0}")]
    Infrastructure(StoreError),
}

impl CrudError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrudError::NotFound { .. } => ErrorKind::NotFound,
            CrudError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            CrudError::Infrastructure(_) => ErrorKind::Infrastructure,
        }
    }

    pub(crate) fn from_store(entity: &'static str, e: StoreError) -> Self {
        match e {
            StoreError::Constraint(reason) => CrudError::ConstraintViolation { entity, reason },
            other => CrudError::Infrastructure(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Crud(#[from] CrudError),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Crud(e) => match e.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found", e.to_string()),
                ErrorKind::ConstraintViolation => {
                    tracing::warn!(error = %e, "constraint violation");
                    (StatusCode::BAD_REQUEST, "constraint_violation", e.to_string())
                }
                ErrorKind::Infrastructure => {
                    tracing::error!(error = %e, "store failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "an internal error occurred".to_string(),
                    )
                }
            },
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", self.to_string()),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_classify_into_kinds() {
        let e = CrudError::from_store("City", StoreError::Constraint("duplicate key".into()));
        assert_eq!(e.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(e.to_string(), "City: duplicate key");

        let e = CrudError::from_store("City", StoreError::Db(sqlx::Error::PoolTimedOut));
        assert_eq!(e.kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn non_database_sqlx_errors_are_infrastructure() {
        let e: StoreError = sqlx::Error::PoolClosed.into();
        assert!(matches!(e, StoreError::Db(_)));
    }

    #[test]
    fn not_found_message_names_entity() {
        let e = CrudError::NotFound { entity: "Team", id: 7 };
        assert_eq!(e.to_string(), "Team not found");
    }

    #[tokio::test]
    async fn status_codes_follow_error_kind() {
        let cases = [
            (CrudError::NotFound { entity: "City", id: 1 }, StatusCode::NOT_FOUND),
            (
                CrudError::ConstraintViolation {
                    entity: "City",
                    reason: "dup".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CrudError::Infrastructure(StoreError::Db(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn validation_is_422() {
        let res = AppError::Validation("email must be a valid email".into()).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
