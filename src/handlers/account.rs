//! Account handlers: one POST endpoint per operation, all taking the request envelope.

use crate::envelope::RequestEnvelope;
use crate::error::AppError;
use crate::response::{AccountInfo, Created, MessageBody};
use crate::state::AppState;
use axum::{extract::State, Json};

/// POST /api/v1/accounts/get
pub async fn get_account(
    State(state): State<AppState>,
    envelope: RequestEnvelope,
) -> Result<Json<AccountInfo>, AppError> {
    Ok(Json(state.accounts.get(&envelope).await?))
}

/// POST /api/v1/accounts/create
pub async fn create_account(
    State(state): State<AppState>,
    envelope: RequestEnvelope,
) -> Result<Json<Created>, AppError> {
    Ok(Json(state.accounts.create(&envelope).await?))
}

/// POST /api/v1/accounts/update
pub async fn update_account(
    State(state): State<AppState>,
    envelope: RequestEnvelope,
) -> Result<Json<MessageBody>, AppError> {
    Ok(Json(state.accounts.update(&envelope).await?))
}

/// POST /api/v1/accounts/delete
pub async fn delete_account(
    State(state): State<AppState>,
    envelope: RequestEnvelope,
) -> Result<Json<MessageBody>, AppError> {
    Ok(Json(state.accounts.delete(&envelope).await?))
}
