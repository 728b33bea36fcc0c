/// Message kinds and recipient statuses defined by the PassBy[ME] service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of request delivered to the recipients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Approve/deny authorization request
    Authorization,
    /// Plain message
    Message,
    /// Electronic signature request
    Esign,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [
        MessageType::Authorization,
        MessageType::Message,
        MessageType::Esign,
    ];

    /// Wire value sent in the `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Authorization => "authorization",
            MessageType::Message => "message",
            MessageType::Esign => "esign",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// Delivery/response state of a single recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Pending,
    Notified,
    Downloaded,
    Seen,
    NotSeen,
    NotNotified,
    NotDownloaded,
    NoDevice,
    Failed,
    Disabled,
    Cancelled,
    Approved,
    Denied,
}

impl MessageStatus {
    pub const ALL: [MessageStatus; 13] = [
        MessageStatus::Pending,
        MessageStatus::Notified,
        MessageStatus::Downloaded,
        MessageStatus::Seen,
        MessageStatus::NotSeen,
        MessageStatus::NotNotified,
        MessageStatus::NotDownloaded,
        MessageStatus::NoDevice,
        MessageStatus::Failed,
        MessageStatus::Disabled,
        MessageStatus::Cancelled,
        MessageStatus::Approved,
        MessageStatus::Denied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "PENDING",
            MessageStatus::Notified => "NOTIFIED",
            MessageStatus::Downloaded => "DOWNLOADED",
            MessageStatus::Seen => "SEEN",
            MessageStatus::NotSeen => "NOT_SEEN",
            MessageStatus::NotNotified => "NOT_NOTIFIED",
            MessageStatus::NotDownloaded => "NOT_DOWNLOADED",
            MessageStatus::NoDevice => "NO_DEVICE",
            MessageStatus::Failed => "FAILED",
            MessageStatus::Disabled => "DISABLED",
            MessageStatus::Cancelled => "CANCELLED",
            MessageStatus::Approved => "APPROVED",
            MessageStatus::Denied => "DENIED",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// A string that is not one of the known enum members
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value {0:?}")]
pub struct UnknownValue(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_from_wire_value() {
        assert_eq!("esign".parse::<MessageType>(), Ok(MessageType::Esign));
        assert_eq!(
            "Message".parse::<MessageType>(),
            Err(UnknownValue("Message".to_string()))
        );
    }

    #[test]
    fn test_message_status_matches_serde_names() {
        for status in MessageStatus::ALL {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, status.as_str());
            assert_eq!(status.as_str().parse::<MessageStatus>(), Ok(status));
        }
        assert!("EXPIRED".parse::<MessageStatus>().is_err());
    }
}
