//! Account operations: each validates the envelope, then makes a single store round trip.

use crate::config::{SchemaRegistry, STATUS_FIELD};
use crate::envelope::{Operation, RequestEnvelope};
use crate::error::{AppError, ConfigError, StoreError, ValidationError};
use crate::notify::{Email, Notifier};
use crate::response::{AccountInfo, Created, MessageBody};
use crate::service::validation::RequestValidator;
use crate::store::{AccountStore, Filter, Record};
use serde_json::Value;
use std::sync::Arc;

const INACTIVE: &str = "Inactive";

/// How a delete request removes an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Keep the row and set its status to inactive.
    Soft,
    /// Remove the row.
    Hard,
}

impl std::str::FromStr for DeletePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "soft" => Ok(DeletePolicy::Soft),
            "hard" => Ok(DeletePolicy::Hard),
            _ => Err(ConfigError::Settings {
                name: "DELETE_POLICY",
                message: format!("invalid delete policy: {} (expected soft or hard)", s),
            }),
        }
    }
}

pub struct AccountService {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    registry: Arc<SchemaRegistry>,
    delete_policy: DeletePolicy,
}

impl AccountService {
    /// With no explicit policy, soft delete is used when every account type has a writable status column.
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        registry: Arc<SchemaRegistry>,
        delete_policy: Option<DeletePolicy>,
    ) -> Result<Self, ConfigError> {
        let soft_ok = registry.supports_soft_delete();
        let delete_policy = match delete_policy {
            Some(DeletePolicy::Soft) if !soft_ok => {
                return Err(ConfigError::Settings {
                    name: "DELETE_POLICY",
                    message: format!(
                        "generation '{}' has no writable '{}' column for soft delete",
                        registry.generation, STATUS_FIELD
                    ),
                })
            }
            Some(policy) => policy,
            None if soft_ok => DeletePolicy::Soft,
            None => DeletePolicy::Hard,
        };
        Ok(AccountService {
            store,
            notifier,
            registry,
            delete_policy,
        })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    fn validator(&self) -> RequestValidator<'_> {
        RequestValidator::new(&self.registry)
    }

    fn identifier_filter(&self, identifier: &str) -> Filter {
        Filter::eq(self.registry.identifier_column.as_str(), identifier)
    }

    pub async fn get(&self, envelope: &RequestEnvelope) -> Result<AccountInfo, AppError> {
        let req = self.validator().validate_as(envelope, Operation::Get)?;
        let columns: Vec<String> = req.attributes.keys().cloned().collect();
        let rows = self
            .store
            .select(&req.object_type.table(), &columns, Some(&self.identifier_filter(&req.identifier)))
            .await?;
        Ok(match rows.into_iter().next() {
            Some(row) => AccountInfo {
                in_use: true,
                message: "Account is registered with user".into(),
                data: Some(row),
            },
            None => AccountInfo {
                in_use: false,
                message: "No account is registered with this identifier.".into(),
                data: None,
            },
        })
    }

    /// Insert the account and queue a welcome email. Notification failures never fail the create.
    /// The identifier fills the identifier column unless the attributes already carry it.
    pub async fn create(&self, envelope: &RequestEnvelope) -> Result<Created, AppError> {
        let req = self.validator().validate_as(envelope, Operation::Create)?;
        let object_type = req.object_type.as_str();
        let read_only = self.registry.read_only_fields(object_type);
        let mut record: Record = req
            .attributes
            .into_iter()
            .filter(|(k, _)| !read_only.contains(k.as_str()))
            .collect();
        let column = &self.registry.identifier_column;
        match record.get(column).map(id_string) {
            Some(given) if given != req.identifier => {
                return Err(ValidationError::IdentifierConflict { column: column.clone() }.into());
            }
            Some(_) => {}
            None => {
                record.insert(column.clone(), Value::String(req.identifier));
            }
        }

        let table = req.object_type.table();
        let row = self.store.insert(&table, record).await?;
        let user_id = row
            .get(&self.registry.id_field)
            .filter(|v| !v.is_null())
            .map(id_string)
            .ok_or_else(|| StoreError::Backend(format!("{} row has no '{}'", table, self.registry.id_field)))?;
        tracing::info!(object_type, %user_id, "account created");

        self.send_welcome(object_type, &row);
        Ok(Created {
            user_id,
            message: "Account creation was successful.".into(),
        })
    }

    fn send_welcome(&self, object_type: &str, row: &Record) {
        let Some(to) = row.get("email").and_then(Value::as_str) else {
            tracing::debug!(object_type, "no email on new account; skipping welcome");
            return;
        };
        let name = self
            .registry
            .name_field(object_type)
            .and_then(|f| row.get(f))
            .and_then(Value::as_str);
        let email = Email::welcome(to, name);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&email).await {
                tracing::warn!(error = %e, to = %email.to, "welcome notification failed");
            }
        });
    }

    /// Apply non-null attributes and confirm the store echoed every one of them back.
    pub async fn update(&self, envelope: &RequestEnvelope) -> Result<MessageBody, AppError> {
        let req = self.validator().validate_as(envelope, Operation::Update)?;
        let read_only = self.registry.read_only_fields(req.object_type.as_str());
        let patch: Record = req
            .attributes
            .into_iter()
            .filter(|(k, v)| !v.is_null() && !read_only.contains(k.as_str()))
            .collect();
        if patch.is_empty() {
            return Err(ValidationError::NoUpdatableAttributes.into());
        }

        let rows = self
            .store
            .update(&req.object_type.table(), &patch, &self.identifier_filter(&req.identifier))
            .await?;
        let Some(row) = rows.first() else {
            return Err(AppError::NotFound("Account not found.".into()));
        };
        let unapplied: Vec<String> = patch
            .iter()
            .filter(|(k, v)| !row.get(k.as_str()).is_some_and(|stored| value_eq(stored, v)))
            .map(|(k, _)| k.clone())
            .collect();
        if !unapplied.is_empty() {
            tracing::warn!(object_type = %req.object_type, fields = ?unapplied, "store did not apply update");
            return Err(AppError::Unapplied(unapplied));
        }
        tracing::info!(object_type = %req.object_type, fields = patch.len(), "account updated");
        Ok(MessageBody::new("Account update was successful."))
    }

    pub async fn delete(&self, envelope: &RequestEnvelope) -> Result<MessageBody, AppError> {
        let req = self.validator().validate_as(envelope, Operation::Delete)?;
        let table = req.object_type.table();
        let filter = self.identifier_filter(&req.identifier);
        let not_found = || AppError::NotFound("Account not found or already deleted.".into());

        let message = match self.delete_policy {
            DeletePolicy::Soft => {
                // Rows already inactive do not match.
                let filter = filter.and_not(STATUS_FIELD, INACTIVE);
                let mut patch = Record::new();
                patch.insert(STATUS_FIELD.into(), Value::String(INACTIVE.into()));
                if self.store.update(&table, &patch, &filter).await?.is_empty() {
                    return Err(not_found());
                }
                "Account deactivation was successful."
            }
            DeletePolicy::Hard => {
                if self.store.delete(&table, &filter).await?.is_empty() {
                    return Err(not_found());
                }
                "Account deletion was successful."
            }
        };
        tracing::info!(object_type = %req.object_type, policy = ?self.delete_policy, "account deleted");
        Ok(MessageBody::new(message))
    }
}

fn id_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equality used for the update round trip. Numbers compare by value so 1 and 1.0 agree.
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
