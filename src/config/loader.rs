//! Load schema generations from the built-in JSON files or from a path, and resolve them.

use crate::config::resolved::{FieldSpec, ObjectSchema, SchemaRegistry};
use crate::config::{validate, SchemaConfig};
use crate::envelope::ObjectType;
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;

const EMAIL_GENERATION: &str = include_str!("../../schemas/email.json");
const AUTH_GENERATION: &str = include_str!("../../schemas/auth.json");

/// Built-in schema generations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    /// Email-keyed accounts with a store-assigned user id.
    Email,
    /// Accounts keyed by the external auth id, with richer optional fields.
    Auth,
}

impl std::str::FromStr for Generation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(Generation::Email),
            "auth" => Ok(Generation::Auth),
            _ => Err(ConfigError::Settings {
                name: "SCHEMA_GENERATION",
                message: format!("unknown generation '{}' (expected email or auth)", s),
            }),
        }
    }
}

pub fn builtin(generation: Generation) -> Result<SchemaConfig, ConfigError> {
    let raw = match generation {
        Generation::Email => EMAIL_GENERATION,
        Generation::Auth => AUTH_GENERATION,
    };
    parse(raw)
}

pub fn parse(raw: &str) -> Result<SchemaConfig, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Load(e.to_string()))
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<SchemaConfig, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading schema generation");
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse(&raw)
}

/// Build the registry from config (validates first).
pub fn resolve(config: &SchemaConfig) -> Result<SchemaRegistry, ConfigError> {
    validate(config)?;

    let mut schemas = BTreeMap::new();
    for schema in &config.object_types {
        let object_type = ObjectType::parse(&schema.object_type).ok_or_else(|| ConfigError::MissingReference {
            kind: "object type",
            id: schema.object_type.clone(),
        })?;
        let fields = schema
            .fields
            .iter()
            .map(|f| FieldSpec {
                name: f.name.clone(),
                required: f.required,
                read_only: f.read_only,
                format: f.format,
            })
            .collect();
        schemas.insert(
            object_type,
            ObjectSchema {
                object_type,
                table: object_type.table(),
                name_field: schema.name_field.clone(),
                fields,
            },
        );
    }

    tracing::debug!(generation = %config.generation, types = schemas.len(), "schema registry resolved");
    Ok(SchemaRegistry {
        generation: config.generation.clone(),
        identifier_scheme: config.identifier_scheme,
        identifier_column: config.identifier_column.clone(),
        id_field: config.id_field.clone(),
        schemas,
    })
}
