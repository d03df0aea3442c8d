//! Request validation: the envelope gate followed by one validator per operation.

use crate::config::SchemaRegistry;
use crate::envelope::{ObjectType, Operation, RequestEnvelope};
use crate::error::ValidationError;
use crate::service::reconcile::Reconciler;
use serde_json::{Map, Value};

/// A request that passed every gate. For `get`, `attributes` holds the requested flags;
/// for `delete` it is empty.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedRequest {
    pub operation: Operation,
    pub object_type: ObjectType,
    pub identifier: String,
    pub attributes: Map<String, Value>,
}

pub struct RequestValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> RequestValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        RequestValidator { registry }
    }

    /// Validate and dispatch on the envelope's own operation.
    pub fn validate(&self, envelope: &RequestEnvelope) -> Result<ValidatedRequest, ValidationError> {
        self.validate_inner(envelope, None)
    }

    /// Like [`validate`](Self::validate), but also rejects an envelope naming a different
    /// operation than `expected`.
    pub fn validate_as(
        &self,
        envelope: &RequestEnvelope,
        expected: Operation,
    ) -> Result<ValidatedRequest, ValidationError> {
        self.validate_inner(envelope, Some(expected))
    }

    fn validate_inner(
        &self,
        envelope: &RequestEnvelope,
        expected: Option<Operation>,
    ) -> Result<ValidatedRequest, ValidationError> {
        let operation = envelope
            .operation
            .as_ref()
            .and_then(Value::as_str)
            .and_then(Operation::parse)
            .ok_or(ValidationError::InvalidFunction)?;
        if let Some(expected) = expected {
            if operation != expected {
                return Err(ValidationError::OperationMismatch {
                    expected,
                    found: operation,
                });
            }
        }

        let object_type = envelope
            .object_type
            .as_ref()
            .and_then(Value::as_str)
            .and_then(ObjectType::parse)
            .ok_or(ValidationError::InvalidObjectType)?;
        if !object_type.is_account() {
            return Err(ValidationError::DelegatedObjectType(object_type.to_string()));
        }

        if !self.registry.identifier_scheme.validate(envelope.identifier.as_ref()) {
            return Err(ValidationError::InvalidIdentifier);
        }
        let identifier = envelope
            .identifier
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ValidationError::InvalidIdentifier)?;

        let attributes = envelope.attributes.as_ref().filter(|v| !v.is_null());
        let attributes = match operation {
            Operation::Get => self.validate_get(object_type, attributes)?,
            Operation::Create => self.validate_create(object_type, attributes)?,
            Operation::Update => self.validate_update(object_type, attributes)?,
            Operation::Delete => self.validate_delete(object_type)?,
        };

        tracing::debug!(%operation, %object_type, "request is valid");
        Ok(ValidatedRequest {
            operation,
            object_type,
            identifier,
            attributes,
        })
    }

    /// At least one attribute, every one in the schema, every flag truthy.
    pub fn validate_get(
        &self,
        object_type: ObjectType,
        attributes: Option<&Value>,
    ) -> Result<Map<String, Value>, ValidationError> {
        let flags = query_flags(attributes)?;
        if flags.is_empty() {
            return Err(ValidationError::NoQueriedAttributes);
        }

        let valid = self.registry.all_fields(object_type.as_str());
        let unknown: Vec<String> = flags.keys().filter(|k| !valid.contains(k.as_str())).cloned().collect();
        if !unknown.is_empty() {
            return Err(ValidationError::UnknownQueriedAttributes {
                object_type: object_type.to_string(),
                fields: unknown,
            });
        }

        let unset: Vec<String> = flags
            .iter()
            .filter(|(_, v)| !is_truthy(v))
            .map(|(k, _)| k.clone())
            .collect();
        if !unset.is_empty() {
            return Err(ValidationError::UnsetQueryFlags(unset));
        }
        Ok(flags)
    }

    /// Required, extra and empty checks, then declared formats of the supplied values.
    /// Only the platform handle declares a format in the shipped generations.
    pub fn validate_create(
        &self,
        object_type: ObjectType,
        attributes: Option<&Value>,
    ) -> Result<Map<String, Value>, ValidationError> {
        let attributes = attribute_map(attributes)?;
        let report = Reconciler::new(self.registry).for_create(object_type.as_str(), &attributes);
        if !report.is_clean() {
            return Err(ValidationError::Attributes(report));
        }

        for (field, value) in &attributes {
            if let Some(scheme) = self.registry.field_format(object_type.as_str(), field) {
                if !scheme.validate(Some(value)) {
                    return Err(ValidationError::InvalidFieldFormat {
                        field: field.clone(),
                        scheme,
                    });
                }
            }
        }
        Ok(attributes)
    }

    /// Non-empty; extra and empty checks only.
    pub fn validate_update(
        &self,
        object_type: ObjectType,
        attributes: Option<&Value>,
    ) -> Result<Map<String, Value>, ValidationError> {
        let attributes = attribute_map(attributes)?;
        if attributes.is_empty() {
            return Err(ValidationError::NoUpdateAttributes);
        }
        let report = Reconciler::new(self.registry).for_update(object_type.as_str(), &attributes);
        if !report.is_clean() {
            return Err(ValidationError::Attributes(report));
        }
        Ok(attributes)
    }

    /// Envelope checks are all a delete needs; existence is checked by the store.
    pub fn validate_delete(&self, _object_type: ObjectType) -> Result<Map<String, Value>, ValidationError> {
        Ok(Map::new())
    }
}

/// Get attributes as flags. A list of names means every listed attribute is requested.
fn query_flags(attributes: Option<&Value>) -> Result<Map<String, Value>, ValidationError> {
    match attributes {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(Value::Array(names)) => Ok(names
            .iter()
            .map(|n| match n {
                Value::String(s) => (s.clone(), Value::Bool(true)),
                other => (other.to_string(), Value::Bool(true)),
            })
            .collect()),
        Some(_) => Err(ValidationError::AttributesNotAnObject),
    }
}

/// `false`, `null`, zero and empty strings, lists or maps leave a flag unset.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

fn attribute_map(attributes: Option<&Value>) -> Result<Map<String, Value>, ValidationError> {
    match attributes {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ValidationError::AttributesNotAnObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin, resolve, Generation};
    use rstest::rstest;
    use serde_json::json;

    fn auth() -> SchemaRegistry {
        resolve(&builtin(Generation::Auth).unwrap()).unwrap()
    }

    fn email() -> SchemaRegistry {
        resolve(&builtin(Generation::Email).unwrap()).unwrap()
    }

    fn envelope(v: Value) -> RequestEnvelope {
        serde_json::from_value(v).unwrap()
    }

    fn check(registry: &SchemaRegistry, v: Value) -> Result<ValidatedRequest, ValidationError> {
        RequestValidator::new(registry).validate(&envelope(v))
    }

    #[test]
    fn get_with_schema_attributes_is_valid() {
        let req = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": "venue",
                "identifier": "123456789101112",
                "attributes": {"user_id": true, "city": true, "postcode": true}
            }),
        )
        .unwrap();
        assert_eq!(req.operation, Operation::Get);
        assert_eq!(req.object_type, ObjectType::Venue);
        assert_eq!(req.attributes.len(), 3);
    }

    #[test]
    fn get_reports_unknown_attributes_before_flags() {
        let err = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": "artist",
                "identifier": "1234567891011",
                "attributes": {"user_id": true, "genres": true, "extra_field": false}
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("extra_field"));
    }

    #[test]
    fn get_rejects_false_flags() {
        let err = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": {"user_id": false, "email": true, "genres": false}
            }),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::UnsetQueryFlags(vec!["genres".into(), "user_id".into()]));
    }

    #[rstest]
    #[case::one(json!(1))]
    #[case::word(json!("yes"))]
    #[case::boolean(json!(true))]
    fn get_accepts_truthy_flags(#[case] flag: Value) {
        let req = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": {"artist_name": flag}
            }),
        )
        .unwrap();
        assert_eq!(req.attributes.len(), 1);
    }

    #[rstest]
    #[case::zero(json!(0))]
    #[case::empty_string(json!(""))]
    #[case::null(json!(null))]
    fn get_rejects_falsy_flags(#[case] flag: Value) {
        let err = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": {"artist_name": flag}
            }),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::UnsetQueryFlags(vec!["artist_name".into()]));
    }

    #[test]
    fn get_list_attributes_are_all_requested() {
        let req = check(
            &auth(),
            json!({
                "operation": "get",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": ["artist_name", "genres"]
            }),
        )
        .unwrap();
        assert_eq!(req.attributes, json!({"artist_name": true, "genres": true}).as_object().unwrap().clone());
    }

    #[rstest]
    #[case::missing(json!(null))]
    #[case::empty_map(json!({}))]
    #[case::empty_list(json!([]))]
    fn get_requires_attributes(#[case] attributes: Value) {
        let err = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": attributes
            }),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::NoQueriedAttributes);
    }

    #[rstest]
    #[case::unknown_function(json!("undefined"))]
    #[case::non_string(json!(7))]
    #[case::missing(json!(null))]
    fn invalid_function_is_rejected_first(#[case] function: Value) {
        let err = check(
            &auth(),
            json!({"function": function, "object_type": "unknown", "identifier": ""}),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidFunction);
    }

    #[rstest]
    #[case("event", "Management of events is handled by a separate API.")]
    #[case("ticket", "Management of tickets is handled by a separate API.")]
    fn delegated_object_types_are_redirected(#[case] object_type: &str, #[case] message: &str) {
        let err = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": object_type,
                "identifier": "example@example.com",
                "attributes": {"user_id": true}
            }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    #[case::undefined(json!("non-defined_account_type"))]
    #[case::missing(json!(null))]
    fn unknown_object_types_are_rejected(#[case] object_type: Value) {
        let err = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": object_type,
                "identifier": "123456789101112",
                "attributes": {"user_id": true}
            }),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid object type. Must be one of ['venue', 'artist', 'attendee']."
        );
    }

    #[rstest]
    #[case::email_in_auth_generation(json!("invalid-email"))]
    #[case::empty(json!(""))]
    #[case::numeric_json(json!(1234567890123_u64))]
    #[case::missing(json!(null))]
    fn identifiers_must_match_the_active_scheme(#[case] identifier: Value) {
        let err = check(
            &auth(),
            json!({
                "function": "get",
                "object_type": "artist",
                "identifier": identifier,
                "attributes": {"user_id": true}
            }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid or missing unique ID.");
    }

    #[test]
    fn email_generation_accepts_email_identifiers_only() {
        let get = |identifier: &str| {
            check(
                &email(),
                json!({
                    "function": "get",
                    "object_type": "venue",
                    "identifier": identifier,
                    "attributes": {"username": true}
                }),
            )
        };
        assert!(get("new@example.com").is_ok());
        assert_eq!(get("123456789101112").unwrap_err(), ValidationError::InvalidIdentifier);
    }

    #[test]
    fn create_with_required_attributes_is_accepted() {
        let req = check(
            &auth(),
            json!({
                "operation": "create",
                "object_type": "artist",
                "identifier": "1234567890",
                "attributes": {"artist_name": "X", "email": "a@b.com", "genres": "Jazz"}
            }),
        )
        .unwrap();
        assert_eq!(req.identifier, "1234567890");
    }

    #[test]
    fn create_with_optional_attributes_is_accepted() {
        assert!(check(
            &auth(),
            json!({
                "operation": "create",
                "object_type": "artist",
                "identifier": "1234567890",
                "attributes": {
                    "artist_name": "X",
                    "email": "a@b.com",
                    "genres": "Jazz",
                    "bio": "Smooth",
                    "spotify_artist_id": "4a0SGxC38bo29VPaHtiFBf"
                }
            }),
        )
        .is_ok());
    }

    #[test]
    fn create_does_not_check_the_email_attribute() {
        let req = check(
            &auth(),
            json!({
                "operation": "create",
                "object_type": "artist",
                "identifier": "1234567890",
                "attributes": {"artist_name": "X", "email": "not-an-email", "genres": "Jazz"}
            }),
        )
        .unwrap();
        assert_eq!(req.attributes["email"], json!("not-an-email"));
    }

    #[test]
    fn create_with_extra_attribute_names_it() {
        let err = check(
            &auth(),
            json!({
                "operation": "create",
                "object_type": "artist",
                "identifier": "1234567890",
                "attributes": {"artist_name": "X", "email": "a@b.com", "genres": "Jazz", "extra": "y"}
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn create_missing_required_names_every_field() {
        let err = check(
            &auth(),
            json!({
                "operation": "create",
                "object_type": "attendee",
                "identifier": "1234567890",
                "attributes": {"first_name": "Ada", "email": "ada@example.com"}
            }),
        )
        .unwrap_err();
        let reason = err.to_string();
        for field in ["last_name", "street_address", "city", "postcode"] {
            assert!(reason.contains(field), "{} missing from '{}'", field, reason);
        }
    }

    #[test]
    fn create_rejects_empty_values() {
        let err = check(
            &auth(),
            json!({
                "function": "create",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": {
                    "user_id": "123456789101112",
                    "artist_name": "Julius",
                    "email": "user@example.com",
                    "genres": "",
                    "spotify_artist_id": "4a0SGxC38bo29VPaHtiFBf"
                }
            }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Every specified attribute must have a value: genres.");
    }

    #[test]
    fn create_rejects_bad_platform_handle() {
        let err = check(
            &auth(),
            json!({
                "function": "create",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": {
                    "artist_name": "Julius",
                    "email": "user@example.com",
                    "genres": "Jazz",
                    "spotify_artist_id": "4a0SG"
                }
            }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFieldFormat {
                field: "spotify_artist_id".into(),
                scheme: crate::service::identifier::IdentifierScheme::PlatformHandle,
            }
        );
    }

    #[test]
    fn update_allows_partial_attributes() {
        assert!(check(
            &auth(),
            json!({
                "function": "update",
                "object_type": "venue",
                "identifier": "123456789101112",
                "attributes": {"city": "Leeds"}
            }),
        )
        .is_ok());
    }

    #[test]
    fn update_rejects_empty_mapping() {
        let err = check(
            &auth(),
            json!({
                "function": "update",
                "object_type": "venue",
                "identifier": "123456789101112",
                "attributes": {}
            }),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::NoUpdateAttributes);
    }

    #[test]
    fn update_rejects_extra_and_empty_attributes() {
        let err = check(
            &auth(),
            json!({
                "function": "update",
                "object_type": "artist",
                "identifier": "123456789101112",
                "attributes": {"undefined_attr": "value", "bio": ""}
            }),
        )
        .unwrap_err();
        let reason = err.to_string();
        assert!(reason.contains("undefined_attr"));
        assert!(reason.contains("bio"));
    }

    #[test]
    fn delete_needs_only_the_envelope() {
        let req = check(
            &auth(),
            json!({"function": "delete", "object_type": "artist", "identifier": "123456789101112"}),
        )
        .unwrap();
        assert!(req.attributes.is_empty());
    }

    #[test]
    fn mismatched_operation_is_rejected_before_attribute_checks() {
        let err = RequestValidator::new(&auth())
            .validate_as(
                &envelope(json!({"function": "get", "object_type": "artist", "identifier": "x"})),
                Operation::Create,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OperationMismatch {
                expected: Operation::Create,
                found: Operation::Get
            }
        );
    }
}
