use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::json::get_json_str;
use crate::types::MessageStatus;

/// State of one recipient of a message, as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientStatus {
    #[serde(rename = "userId")]
    user_id: String,
    /// Raw status string, kept even when it is not a known [`MessageStatus`]
    status: String,
}

impl RecipientStatus {
    /// Parse one element of the `recipients` array
    pub fn from_json(json: &Value) -> Result<Self> {
        Ok(Self {
            user_id: get_json_str(json, "userId")?.to_string(),
            status: get_json_str(json, "status")?.to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn known_status(&self) -> Option<MessageStatus> {
        self.status.parse().ok()
    }
}
