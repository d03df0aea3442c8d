//! Attribute reconciliation: compares a request's attribute keys against the schema registry.
//!
//! Each check reports every offending key, and [`Reconciler::for_create`] runs all of them so a
//! caller gets the full diagnosis in one round trip.

use crate::config::SchemaRegistry;
use serde_json::{Map, Value};
use std::fmt;

/// How the extra-attribute check treats an object type with no schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownTypePolicy {
    /// Every supplied key is extra.
    #[default]
    Strict,
    /// Nothing is extra. Legacy behavior; disagrees with the required-attribute check,
    /// which always rejects an unknown type.
    Permissive,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeReport {
    /// Set when the required check found no schema for the object type.
    pub unknown_type: Option<String>,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
    pub empty: Vec<String>,
}

impl AttributeReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_type.is_none() && self.missing.is_empty() && self.extra.is_empty() && self.empty.is_empty()
    }
}

impl fmt::Display for AttributeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(t) = &self.unknown_type {
            parts.push(format!("No attribute schema is defined for object type '{}'.", t));
        }
        if !self.missing.is_empty() {
            parts.push(format!("Missing required attribute keys: {}.", self.missing.join(", ")));
        }
        if !self.extra.is_empty() {
            parts.push(format!(
                "Additional, undefined attributes cannot be specified: {}.",
                self.extra.join(", ")
            ));
        }
        if !self.empty.is_empty() {
            parts.push(format!("Every specified attribute must have a value: {}.", self.empty.join(", ")));
        }
        f.write_str(&parts.join(" "))
    }
}

pub struct Reconciler<'a> {
    registry: &'a SchemaRegistry,
    policy: UnknownTypePolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Reconciler {
            registry,
            policy: UnknownTypePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownTypePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Keys outside the object type's full field set, sorted.
    pub fn extra_attributes(&self, object_type: &str, attributes: &Map<String, Value>) -> Vec<String> {
        let all = self.registry.all_fields(object_type);
        if all.is_empty() && self.policy == UnknownTypePolicy::Permissive {
            return Vec::new();
        }
        attributes.keys().filter(|k| !all.contains(k.as_str())).cloned().collect()
    }

    /// Required keys not supplied, sorted. `None` when the object type has no schema.
    pub fn missing_attributes(&self, object_type: &str, attributes: &Map<String, Value>) -> Option<Vec<String>> {
        self.registry.schema(object_type)?;
        Some(
            self.registry
                .required_fields(object_type)
                .into_iter()
                .filter(|f| !attributes.contains_key(*f))
                .map(String::from)
                .collect(),
        )
    }

    /// Keys mapped to an empty string, sorted.
    pub fn empty_attributes(&self, attributes: &Map<String, Value>) -> Vec<String> {
        attributes
            .iter()
            .filter(|(_, v)| v.as_str() == Some(""))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Required, extra and empty checks together.
    pub fn for_create(&self, object_type: &str, attributes: &Map<String, Value>) -> AttributeReport {
        let mut report = self.for_update(object_type, attributes);
        match self.missing_attributes(object_type, attributes) {
            Some(missing) => report.missing = missing,
            None => report.unknown_type = Some(object_type.to_string()),
        }
        report
    }

    /// Extra and empty checks; partial updates skip the required check.
    pub fn for_update(&self, object_type: &str, attributes: &Map<String, Value>) -> AttributeReport {
        AttributeReport {
            extra: self.extra_attributes(object_type, attributes),
            empty: self.empty_attributes(attributes),
            ..AttributeReport::default()
        }
    }
}
