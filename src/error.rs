//! Typed errors and HTTP mapping.

use crate::envelope::Operation;
use crate::service::identifier::IdentifierScheme;
use crate::service::reconcile::AttributeReport;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Fixed payload returned when a body is missing, not JSON, or not a non-empty object.
pub const MALFORMED_PAYLOAD: &str = "Invalid or missing JSON payload";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("duplicate {kind}: {id}")]
    Duplicate { kind: &'static str, id: String },
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("invalid setting {name}: {message}")]
    Settings { name: &'static str, message: String },
}

/// Reasons a request is rejected before any store call is made. The display
/// string is the reason returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid function specified.")]
    InvalidFunction,
    #[error("This endpoint only handles '{expected}' requests, got '{found}'.")]
    OperationMismatch { expected: Operation, found: Operation },
    #[error("Management of {0}s is handled by a separate API.")]
    DelegatedObjectType(String),
    #[error("Invalid object type. Must be one of ['venue', 'artist', 'attendee'].")]
    InvalidObjectType,
    #[error("Invalid or missing unique ID.")]
    InvalidIdentifier,
    #[error("Attributes must be a JSON object.")]
    AttributesNotAnObject,
    #[error("Attributes must be provided for querying.")]
    NoQueriedAttributes,
    #[error("Invalid attributes for object type '{object_type}': {}.", .fields.join(", "))]
    UnknownQueriedAttributes { object_type: String, fields: Vec<String> },
    #[error("Every queried attribute must have a true value: {}.", .0.join(", "))]
    UnsetQueryFlags(Vec<String>),
    #[error("{0}")]
    Attributes(AttributeReport),
    #[error("Invalid {scheme} for attribute '{field}'.")]
    InvalidFieldFormat { field: String, scheme: IdentifierScheme },
    #[error("At least one attribute must be specified for update.")]
    NoUpdateAttributes,
    #[error("No valid attributes provided for update.")]
    NoUpdatableAttributes,
    #[error("Attribute '{column}' must match the identifier when both are given.")]
    IdentifierConflict { column: String },
    #[error("Invalid email format.")]
    InvalidEmail,
    #[error("Search term must be a non-empty string.")]
    EmptySearchTerm,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Backend(String),
    #[error("no row returned from {0}")]
    NoRow(String),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notification rejected with status {0}")]
    Rejected(u16),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MalformedEnvelope(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("An exception occurred: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to update account: Attributes not updated as expected: {}.", .0.join(", "))]
    Unapplied(Vec<String>),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedEnvelope(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Unapplied(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
