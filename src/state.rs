//! Shared application state for all routes. Immutable after startup.

use crate::config::{builtin, load_from_path, resolve, SchemaRegistry, Settings};
use crate::error::{AppError, ConfigError};
use crate::notify::{HttpNotifier, LogNotifier, Notifier};
use crate::service::{AccountService, DeletePolicy, LookupService};
use crate::store::{AccountStore, MemoryStore, PgAccountStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub lookup: Arc<LookupService>,
    /// Used by the readiness probe.
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        registry: Arc<SchemaRegistry>,
        delete_policy: Option<DeletePolicy>,
        fuzzy_threshold: u8,
    ) -> Result<Self, ConfigError> {
        let accounts = AccountService::new(store.clone(), notifier, registry.clone(), delete_policy)?;
        let lookup = LookupService::new(store.clone(), registry, fuzzy_threshold);
        Ok(AppState {
            accounts: Arc::new(accounts),
            lookup: Arc::new(lookup),
            store,
        })
    }

    /// Load the schema generation, connect the store and pick a notifier.
    pub async fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let config = match &settings.schema_path {
            Some(path) => load_from_path(path).await?,
            None => builtin(settings.generation)?,
        };
        let registry = Arc::new(resolve(&config)?);
        tracing::info!(generation = %registry.generation, "schema generation loaded");

        let store: Arc<dyn AccountStore> = match &settings.database_url {
            Some(url) => Arc::new(PgAccountStore::connect(url, settings.db_schema.clone()).await?),
            None => {
                tracing::warn!("DATABASE_URL not set; accounts are kept in memory and lost on exit");
                Arc::new(MemoryStore::new(registry.id_field.clone()))
            }
        };

        let notifier: Arc<dyn Notifier> = match &settings.notify_url {
            Some(url) => Arc::new(
                HttpNotifier::new(url.clone(), settings.notify_api_key.clone(), settings.notify_sender.clone())
                    .map_err(|e| ConfigError::Settings {
                        name: "NOTIFY_URL",
                        message: e.to_string(),
                    })?,
            ),
            None => Arc::new(LogNotifier),
        };

        Ok(Self::new(
            store,
            notifier,
            registry,
            settings.delete_policy,
            settings.fuzzy_threshold,
        )?)
    }
}
