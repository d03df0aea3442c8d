//! Raw schema-generation types matching the JSON files under `schemas/`.

use crate::service::identifier::IdentifierScheme;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    /// Assigned by the store; stripped from records before writing.
    #[serde(default)]
    pub read_only: bool,
    /// When set, a present value must pass this identifier format on create.
    #[serde(default)]
    pub format: Option<IdentifierScheme>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectSchemaConfig {
    pub object_type: String,
    /// Column holding the display name, used by name lookup.
    #[serde(default)]
    pub name_field: Option<String>,
    pub fields: Vec<FieldConfig>,
}

/// One schema generation: which identifier scheme requests use, which column it matches,
/// and the attribute set of every account type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub generation: String,
    pub identifier_scheme: IdentifierScheme,
    pub identifier_column: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    pub object_types: Vec<ObjectSchemaConfig>,
}

fn default_id_field() -> String {
    "user_id".into()
}
