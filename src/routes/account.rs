//! Account and lookup routes, mounted under /api/v1.

use crate::handlers::{create_account, delete_account, email_in_use, get_account, lookup_artist, update_account};
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn account_routes(state: AppState) -> Router {
    Router::new()
        .route("/accounts/get", post(get_account))
        .route("/accounts/create", post(create_account))
        .route("/accounts/update", post(update_account))
        .route("/accounts/delete", post(delete_account))
        .route("/accounts/email", post(email_in_use))
        .route("/artists/lookup", post(lookup_artist))
        .with_state(state)
}
