//! Success bodies returned by the account and lookup endpoints.

use crate::store::Record;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Created {
    pub user_id: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        MessageBody {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AccountInfo {
    pub in_use: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
}

/// Result of an email-in-use check. `account_type` and `user_id` are set only when in use.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmailUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<serde_json::Value>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistMatch {
    pub name: String,
    pub id: serde_json::Value,
}
