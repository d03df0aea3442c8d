//! Request envelope shared by every account endpoint, plus the operation and object type enums.

use crate::error::{AppError, MALFORMED_PAYLOAD};
use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "get" => Some(Operation::Get),
            "create" => Some(Operation::Create),
            "update" => Some(Operation::Update),
            "delete" => Some(Operation::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every object type the platform knows about. Only the account kinds are managed here;
/// events and tickets belong to a separate API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Venue,
    Artist,
    Attendee,
    Event,
    Ticket,
}

impl ObjectType {
    pub const ACCOUNTS: [ObjectType; 3] = [ObjectType::Venue, ObjectType::Artist, ObjectType::Attendee];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "venue" => Some(ObjectType::Venue),
            "artist" => Some(ObjectType::Artist),
            "attendee" => Some(ObjectType::Attendee),
            "event" => Some(ObjectType::Event),
            "ticket" => Some(ObjectType::Ticket),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Venue => "venue",
            ObjectType::Artist => "artist",
            ObjectType::Attendee => "attendee",
            ObjectType::Event => "event",
            ObjectType::Ticket => "ticket",
        }
    }

    pub fn is_account(self) -> bool {
        matches!(self, ObjectType::Venue | ObjectType::Artist | ObjectType::Attendee)
    }

    /// Backing table: the object type pluralized.
    pub fn table(self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw request as received. Fields stay loosely typed so that a wrong value is reported
/// as a validation reason rather than a parse failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, alias = "function")]
    pub operation: Option<Value>,
    #[serde(default)]
    pub object_type: Option<Value>,
    #[serde(default)]
    pub identifier: Option<Value>,
    #[serde(default)]
    pub attributes: Option<Value>,
}

impl RequestEnvelope {
    pub fn from_map(map: Map<String, Value>) -> Result<Self, AppError> {
        serde_json::from_value(Value::Object(map)).map_err(|e| {
            tracing::debug!(error = %e, "envelope did not deserialize");
            AppError::MalformedEnvelope(MALFORMED_PAYLOAD)
        })
    }
}

/// JSON body that must be a non-empty object. Anything else is rejected with the fixed
/// malformed-payload error before handlers run.
#[derive(Clone, Debug)]
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(%rejection, "rejected request body");
            AppError::MalformedEnvelope(MALFORMED_PAYLOAD)
        })?;
        match value {
            Value::Object(map) if !map.is_empty() => Ok(JsonObject(map)),
            _ => Err(AppError::MalformedEnvelope(MALFORMED_PAYLOAD)),
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for RequestEnvelope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonObject(map) = JsonObject::from_request(req, state).await?;
        RequestEnvelope::from_map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn function_is_accepted_as_alias_for_operation() {
        let map = json!({"function": "get", "object_type": "venue"});
        let Value::Object(map) = map else { unreachable!() };
        let env = RequestEnvelope::from_map(map).unwrap();
        assert_eq!(env.operation, Some(json!("get")));
        assert_eq!(env.object_type, Some(json!("venue")));
        assert!(env.attributes.is_none());
    }

    #[test]
    fn tables_are_pluralized() {
        assert_eq!(ObjectType::Attendee.table(), "attendees");
        assert_eq!(ObjectType::Venue.table(), "venues");
    }

    #[test]
    fn delegated_types_are_not_accounts() {
        assert!(!ObjectType::Event.is_account());
        assert!(!ObjectType::Ticket.is_account());
        assert!(ObjectType::ACCOUNTS.iter().all(|t| t.is_account()));
    }
}
