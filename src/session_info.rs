/// Tracked state of a sent message
/// A SessionInfo borrows the client that created it and refreshes itself
/// through the [`MessageOperations`] capability.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::fmt;

use crate::error::{Error, Result};
use crate::json::{get_json_array, get_json_str};
use crate::recipient_status::RecipientStatus;

/// Track and cancel a message by id, returning the service's session JSON
#[async_trait]
pub trait MessageOperations: Send + Sync {
    async fn track(&self, message_id: &str) -> Result<Value>;

    async fn cancel(&self, message_id: &str) -> Result<Value>;
}

/// Handle to a message previously submitted to the service
pub struct SessionInfo<'c> {
    message_id: String,
    expiration_date: DateTime<FixedOffset>,
    recipient_statuses: Vec<RecipientStatus>,
    operations: &'c dyn MessageOperations,
}

impl<'c> SessionInfo<'c> {
    /// Parse a session JSON object (`messageId`, `expirationDate`, `recipients`)
    pub fn from_json(json: &Value, operations: &'c dyn MessageOperations) -> Result<Self> {
        let message_id = get_json_str(json, "messageId")?.to_string();
        let (expiration_date, recipient_statuses) = parse_state(json)?;

        tracing::info!(
            "Session {} created with {} recipient(s)",
            message_id,
            recipient_statuses.len()
        );

        Ok(Self {
            message_id,
            expiration_date,
            recipient_statuses,
            operations,
        })
    }

    /// Replace expiration date and recipient statuses from a fresh session JSON.
    /// The message id is kept; nothing is changed if parsing fails.
    pub fn re_initialize(&mut self, json: &Value) -> Result<()> {
        let reported_id = get_json_str(json, "messageId")?;
        if reported_id != self.message_id {
            tracing::warn!(
                "Session {} refreshed from a response for message {}",
                self.message_id,
                reported_id
            );
        }

        let (expiration_date, recipient_statuses) = parse_state(json)?;
        self.expiration_date = expiration_date;
        self.recipient_statuses = recipient_statuses;

        tracing::info!(
            "Session {} refreshed with {} recipient(s)",
            self.message_id,
            self.recipient_statuses.len()
        );
        Ok(())
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn expiration_date(&self) -> DateTime<FixedOffset> {
        self.expiration_date
    }

    /// Recipient statuses in the order the service returned them
    pub fn recipient_statuses(&self) -> &[RecipientStatus] {
        &self.recipient_statuses
    }

    /// Fetch the current state of this message and update in place
    pub async fn refresh(&mut self) -> Result<()> {
        let json = self.operations.track(&self.message_id).await?;
        self.re_initialize(&json)
    }

    /// Cancel this message and update in place with the returned state
    pub async fn cancel(&mut self) -> Result<()> {
        let json = self.operations.cancel(&self.message_id).await?;
        self.re_initialize(&json)
    }
}

impl fmt::Debug for SessionInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionInfo")
            .field("message_id", &self.message_id)
            .field("expiration_date", &self.expiration_date)
            .field("recipient_statuses", &self.recipient_statuses)
            .finish_non_exhaustive()
    }
}

fn parse_state(json: &Value) -> Result<(DateTime<FixedOffset>, Vec<RecipientStatus>)> {
    let raw_date = get_json_str(json, "expirationDate")?;
    let expiration_date =
        DateTime::parse_from_rfc3339(raw_date).map_err(|source| Error::InvalidTimestamp {
            value: raw_date.to_string(),
            source,
        })?;

    let recipient_statuses = get_json_array(json, "recipients")?
        .iter()
        .map(RecipientStatus::from_json)
        .collect::<Result<Vec<_>>>()?;

    Ok((expiration_date, recipient_statuses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageStatus;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned session JSON and remembers which ids were asked for
    struct ScriptedOperations {
        replies: Mutex<Vec<Value>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedOperations {
        fn new(replies: Vec<Value>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn reply(&self, call: String) -> Result<Value> {
            self.calls.lock().unwrap().push(call);
            Ok(self.replies.lock().unwrap().remove(0))
        }
    }

    #[async_trait]
    impl MessageOperations for ScriptedOperations {
        async fn track(&self, message_id: &str) -> Result<Value> {
            self.reply(format!("track {}", message_id))
        }

        async fn cancel(&self, message_id: &str) -> Result<Value> {
            self.reply(format!("cancel {}", message_id))
        }
    }

    fn session_json(status: &str) -> Value {
        json!({
            "messageId": "YzX95zUA1et2ijQ",
            "expirationDate": "2015-06-11T13:06:12.658+02:00",
            "recipients": [{ "userId": "pbmId1", "status": status }]
        })
    }

    #[test]
    fn test_parse_session_info() {
        let ops = ScriptedOperations::new(vec![]);
        let json = json!({
            "messageId": "YzX95zUA1et2ijQ",
            "expirationDate": "2015-06-11T13:06:12.658+02:00",
            "recipients": [
                { "userId": "pbmId1", "status": "PENDING" },
                { "userId": "pbmId2", "status": "NOTIFIED" },
                { "userId": "pbmId3", "status": "SEEN" }
            ]
        });

        let session = SessionInfo::from_json(&json, &ops).unwrap();
        assert_eq!(session.message_id(), "YzX95zUA1et2ijQ");
        assert_eq!(
            session.expiration_date(),
            DateTime::parse_from_rfc3339("2015-06-11T11:06:12.658Z").unwrap()
        );
        let users: Vec<&str> = session
            .recipient_statuses()
            .iter()
            .map(|r| r.user_id())
            .collect();
        assert_eq!(users, ["pbmId1", "pbmId2", "pbmId3"]);
        assert_eq!(
            session.recipient_statuses()[2].known_status(),
            Some(MessageStatus::Seen)
        );
    }

    #[test]
    fn test_missing_session_fields() {
        let ops = ScriptedOperations::new(vec![]);
        for field in ["messageId", "expirationDate", "recipients"] {
            let mut json = session_json("PENDING");
            json.as_object_mut().unwrap().remove(field);
            match SessionInfo::from_json(&json, &ops) {
                Err(Error::MissingField(missing)) => assert_eq!(missing, field),
                other => panic!("expected missing {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_bad_expiration_date() {
        let ops = ScriptedOperations::new(vec![]);
        let mut json = session_json("PENDING");
        json["expirationDate"] = json!("next tuesday");
        let err = SessionInfo::from_json(&json, &ops).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_failed_re_initialize_keeps_state() {
        let ops = ScriptedOperations::new(vec![]);
        let mut session = SessionInfo::from_json(&session_json("PENDING"), &ops).unwrap();

        let mut broken = session_json("APPROVED");
        broken["recipients"][0].as_object_mut().unwrap().remove("status");
        assert!(session.re_initialize(&broken).is_err());
        assert_eq!(session.recipient_statuses()[0].status(), "PENDING");
    }

    #[tokio::test]
    async fn test_refresh_updates_in_place() {
        let ops = ScriptedOperations::new(vec![session_json("APPROVED")]);
        let mut session = SessionInfo::from_json(&session_json("PENDING"), &ops).unwrap();
        let handle = &mut session;

        handle.refresh().await.unwrap();

        assert_eq!(handle.message_id(), "YzX95zUA1et2ijQ");
        assert_eq!(handle.recipient_statuses()[0].status(), "APPROVED");
        assert_eq!(*ops.calls.lock().unwrap(), ["track YzX95zUA1et2ijQ"]);
    }

    #[tokio::test]
    async fn test_cancel_updates_in_place() {
        let ops = ScriptedOperations::new(vec![session_json("CANCELLED")]);
        let mut session = SessionInfo::from_json(&session_json("PENDING"), &ops).unwrap();

        session.cancel().await.unwrap();

        assert_eq!(
            session.recipient_statuses()[0].known_status(),
            Some(MessageStatus::Cancelled)
        );
        assert_eq!(*ops.calls.lock().unwrap(), ["cancel YzX95zUA1et2ijQ"]);
    }
}
