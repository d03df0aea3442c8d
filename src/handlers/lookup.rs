//! Lookup handlers. Bodies are single-key objects rather than full envelopes.

use crate::envelope::JsonObject;
use crate::error::AppError;
use crate::response::{ArtistMatch, EmailUsage};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{Map, Value};

fn string_field<'a>(body: &'a Map<String, Value>, key: &str, missing: &'static str) -> Result<&'a str, AppError> {
    body.get(key).and_then(Value::as_str).ok_or(AppError::MalformedEnvelope(missing))
}

/// POST /api/v1/accounts/email
pub async fn email_in_use(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<EmailUsage>, AppError> {
    let email = string_field(&body, "email", "Invalid or missing email in JSON payload")?;
    Ok(Json(state.lookup.email_in_use(email).await?))
}

/// POST /api/v1/artists/lookup
pub async fn lookup_artist(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<ArtistMatch>, AppError> {
    let name = string_field(&body, "name", "Invalid or missing name in JSON payload")?;
    Ok(Json(state.lookup.find_artist(name).await?))
}
