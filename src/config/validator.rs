//! Schema config validation: every account type present, references resolvable, no duplicates.

use crate::config::SchemaConfig;
use crate::envelope::ObjectType;
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(config: &SchemaConfig) -> Result<(), ConfigError> {
    let mut seen_types = HashSet::new();
    for schema in &config.object_types {
        let object_type = ObjectType::parse(&schema.object_type).ok_or_else(|| {
            ConfigError::Validation(format!("unknown object type '{}'", schema.object_type))
        })?;
        if !object_type.is_account() {
            return Err(ConfigError::Validation(format!(
                "object type '{}' is managed by a separate API and cannot have a schema here",
                object_type
            )));
        }
        if !seen_types.insert(object_type) {
            return Err(ConfigError::Duplicate {
                kind: "object type",
                id: schema.object_type.clone(),
            });
        }

        let mut field_names = HashSet::new();
        for field in &schema.fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{}: field names must be non-empty",
                    schema.object_type
                )));
            }
            if !field_names.insert(field.name.as_str()) {
                return Err(ConfigError::Duplicate {
                    kind: "field",
                    id: format!("{}.{}", schema.object_type, field.name),
                });
            }
            if field.required && field.read_only {
                return Err(ConfigError::Validation(format!(
                    "{}.{}: a read-only field cannot be required",
                    schema.object_type, field.name
                )));
            }
        }

        for (kind, column) in [
            ("identifier column", Some(config.identifier_column.as_str())),
            ("id field", Some(config.id_field.as_str())),
            ("name field", schema.name_field.as_deref()),
        ] {
            if let Some(column) = column {
                if !field_names.contains(column) {
                    return Err(ConfigError::MissingReference {
                        kind,
                        id: format!("{}.{}", schema.object_type, column),
                    });
                }
            }
        }
    }

    for account in ObjectType::ACCOUNTS {
        if !seen_types.contains(&account) {
            return Err(ConfigError::MissingReference {
                kind: "object type",
                id: account.to_string(),
            });
        }
    }

    Ok(())
}
