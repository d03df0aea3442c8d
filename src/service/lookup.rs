//! Read-only lookups: fuzzy artist search and email-in-use checks.

use crate::config::SchemaRegistry;
use crate::envelope::ObjectType;
use crate::error::{AppError, ConfigError, ValidationError};
use crate::response::{ArtistMatch, EmailUsage};
use crate::search::{LevenshteinMatcher, NameMatcher};
use crate::service::identifier::is_valid_email;
use crate::store::{AccountStore, Filter};
use serde_json::Value;
use std::sync::Arc;

const EMAIL_FIELD: &str = "email";

pub struct LookupService {
    store: Arc<dyn AccountStore>,
    registry: Arc<SchemaRegistry>,
    matcher: Arc<dyn NameMatcher>,
    threshold: u8,
}

impl LookupService {
    pub fn new(store: Arc<dyn AccountStore>, registry: Arc<SchemaRegistry>, threshold: u8) -> Self {
        LookupService {
            store,
            registry,
            matcher: Arc::new(LevenshteinMatcher),
            threshold,
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn NameMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Closest artist by display name, accepted only at or above the threshold.
    pub async fn find_artist(&self, name: &str) -> Result<ArtistMatch, AppError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptySearchTerm.into());
        }
        let artist = ObjectType::Artist;
        let name_field = self
            .registry
            .name_field(artist.as_str())
            .ok_or_else(|| ConfigError::MissingReference {
                kind: "name field",
                id: artist.to_string(),
            })?;
        let id_field = self.registry.id_field.as_str();

        let rows = self
            .store
            .select(&artist.table(), &[name_field.to_string(), id_field.to_string()], None)
            .await?;
        let names: Vec<String> = rows
            .iter()
            .map(|r| r.get(name_field).and_then(Value::as_str).unwrap_or_default().to_string())
            .collect();

        match self.matcher.best_match(name, &names) {
            Some(m) if m.score >= self.threshold => {
                tracing::debug!(query = name, score = m.score, "artist matched");
                let id = rows
                    .get(m.index)
                    .and_then(|r| r.get(id_field))
                    .cloned()
                    .unwrap_or(Value::Null);
                let name = names.get(m.index).cloned().unwrap_or_default();
                Ok(ArtistMatch { name, id })
            }
            best => {
                tracing::debug!(query = name, best = ?best.map(|m| m.score), "no artist above threshold");
                Err(AppError::NotFound("No match found.".into()))
            }
        }
    }

    /// First account type, in registry order, holding an account with this email.
    pub async fn email_in_use(&self, email: &str) -> Result<EmailUsage, AppError> {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        let id_field = &self.registry.id_field;
        let filter = Filter::eq(EMAIL_FIELD, email);
        for schema in self.registry.account_schemas().filter(|s| s.field(EMAIL_FIELD).is_some()) {
            let rows = self
                .store
                .select(&schema.table, std::slice::from_ref(id_field), Some(&filter))
                .await?;
            if let Some(row) = rows.into_iter().next() {
                return Ok(EmailUsage {
                    account_type: Some(schema.object_type.to_string()),
                    user_id: row.get(id_field).cloned(),
                    message: "Email is registered with user".into(),
                });
            }
        }
        Ok(EmailUsage {
            account_type: None,
            user_id: None,
            message: "Email is not in use.".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin, resolve, Generation};
    use crate::search::Match;
    use crate::store::{MemoryStore, Record};
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => Record::new(),
        }
    }

    fn lookup(store: MemoryStore) -> LookupService {
        let registry = Arc::new(resolve(&builtin(Generation::Auth).unwrap()).unwrap());
        LookupService::new(Arc::new(store), registry, 75)
    }

    fn artists() -> MemoryStore {
        MemoryStore::new("user_id").with_rows(
            "artists",
            vec![
                record(json!({"user_id": "1111111111", "artist_name": "Adele", "email": "adele@example.com"})),
                record(json!({"user_id": "2222222222", "artist_name": "Drake", "email": "drake@example.com"})),
            ],
        )
    }

    #[tokio::test]
    async fn close_misspelling_finds_the_artist() {
        let m = lookup(artists()).find_artist("Drke").await.unwrap();
        assert_eq!(m, ArtistMatch { name: "Drake".into(), id: json!("2222222222") });
    }

    #[tokio::test]
    async fn distant_query_has_no_match() {
        let err = lookup(artists()).find_artist("Zzzqx").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "No match found."));
    }

    #[tokio::test]
    async fn empty_catalogue_has_no_match() {
        let err = lookup(MemoryStore::new("user_id")).find_artist("Drake").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_search_term_is_rejected() {
        let err = lookup(artists()).find_artist("  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::EmptySearchTerm)));
    }

    struct FixedMatcher(Match);

    impl NameMatcher for FixedMatcher {
        fn best_match(&self, _query: &str, _candidates: &[String]) -> Option<Match> {
            Some(self.0)
        }
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let svc = lookup(artists()).with_matcher(Arc::new(FixedMatcher(Match { index: 0, score: 75 })));
        assert_eq!(svc.find_artist("anything").await.unwrap().name, "Adele");
        let svc = lookup(artists()).with_matcher(Arc::new(FixedMatcher(Match { index: 0, score: 74 })));
        assert!(svc.find_artist("anything").await.is_err());
    }

    #[tokio::test]
    async fn email_in_use_reports_account_type() {
        let usage = lookup(artists()).email_in_use("drake@example.com").await.unwrap();
        assert_eq!(usage.account_type.as_deref(), Some("artist"));
        assert_eq!(usage.user_id, Some(json!("2222222222")));
    }

    #[tokio::test]
    async fn unused_email_is_reported() {
        let usage = lookup(artists()).email_in_use("nobody@example.com").await.unwrap();
        assert!(usage.account_type.is_none());
        assert_eq!(usage.message, "Email is not in use.");
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_before_lookup() {
        let svc = lookup(MemoryStore::failing("should not be called"));
        let err = svc.email_in_use("not-an-email").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format.");
    }
}
