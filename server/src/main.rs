//! Account manager server.
//!
//! Run from repo root: `cargo run -p account-server`

use account_manager::{router, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("account_manager=info,account_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let state = AppState::from_settings(&settings).await?;
    tracing::info!(delete_policy = ?state.accounts.delete_policy(), "account service ready");

    let app = router(state, settings.max_body_bytes);
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("account manager listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
