//! Resolved schema registry: config validated and indexed for runtime lookups.

use crate::envelope::ObjectType;
use crate::service::identifier::IdentifierScheme;
use std::collections::{BTreeMap, BTreeSet};

/// Column written by soft delete.
pub const STATUS_FIELD: &str = "status";

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub read_only: bool,
    pub format: Option<IdentifierScheme>,
}

#[derive(Clone, Debug)]
pub struct ObjectSchema {
    pub object_type: ObjectType,
    pub table: String,
    pub name_field: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl ObjectSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct SchemaRegistry {
    pub generation: String,
    pub identifier_scheme: IdentifierScheme,
    /// Column matched against the request identifier on get, update and delete.
    pub identifier_column: String,
    /// Column holding the account id returned to callers.
    pub id_field: String,
    pub schemas: BTreeMap<ObjectType, ObjectSchema>,
}

impl SchemaRegistry {
    /// Object types absent from the registry (including unparseable names) yield `None`.
    pub fn schema(&self, object_type: &str) -> Option<&ObjectSchema> {
        ObjectType::parse(object_type).and_then(|t| self.schemas.get(&t))
    }

    pub fn all_fields(&self, object_type: &str) -> BTreeSet<&str> {
        self.fields_where(object_type, |_| true)
    }

    pub fn required_fields(&self, object_type: &str) -> BTreeSet<&str> {
        self.fields_where(object_type, |f| f.required)
    }

    pub fn optional_fields(&self, object_type: &str) -> BTreeSet<&str> {
        self.fields_where(object_type, |f| !f.required)
    }

    pub fn read_only_fields(&self, object_type: &str) -> BTreeSet<&str> {
        self.fields_where(object_type, |f| f.read_only)
    }

    pub fn field_format(&self, object_type: &str, field: &str) -> Option<IdentifierScheme> {
        self.schema(object_type)?.field(field)?.format
    }

    pub fn name_field(&self, object_type: &str) -> Option<&str> {
        self.schema(object_type)?.name_field.as_deref()
    }

    pub fn account_schemas(&self) -> impl Iterator<Item = &ObjectSchema> {
        self.schemas.values()
    }

    /// Soft delete needs a writable status column on every account type.
    pub fn supports_soft_delete(&self) -> bool {
        !self.schemas.is_empty()
            && self
                .schemas
                .values()
                .all(|s| s.field(STATUS_FIELD).is_some_and(|f| !f.read_only))
    }

    fn fields_where(&self, object_type: &str, keep: impl Fn(&FieldSpec) -> bool) -> BTreeSet<&str> {
        self.schema(object_type)
            .map(|s| s.fields.iter().filter(|f| keep(f)).map(|f| f.name.as_str()).collect())
            .unwrap_or_default()
    }
}
