/// PassBy[ME] client
/// Sends, tracks and cancels messages. Inputs are validated before anything
/// goes over the wire; responses are classified into HTTP failures,
/// service-reported (420) errors and session JSON.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session_info::{MessageOperations, SessionInfo};
use crate::transport::{HttpRequest, HttpResponse, HttpsTransport, Transport};
use crate::types::MessageType;

pub const API_VERSION_HEADER: &str = "X-PBM-API-VERSION";
pub const API_VERSION: &str = "1";

/// Status the service uses for structured application errors
pub const SERVICE_ERROR_STATUS: u16 = 420;

const MESSAGES_PATH: &str = "/frontend/messages";

/// Parameters of a new message
#[derive(Debug, Clone, PartialEq)]
pub struct MessageParams {
    /// Recipient identifiers, at least one
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Seconds the message stays valid. Integers and integer strings are accepted.
    pub availability: Value,
    /// Wire value of a [`MessageType`]
    pub message_type: String,
    /// URL the service calls when the message state changes
    pub callback_url: Option<String>,
}

impl MessageParams {
    pub fn new<I, S>(recipients: I, availability: impl Into<Value>, message_type: MessageType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recipients: recipients.into_iter().map(Into::into).collect(),
            subject: None,
            body: None,
            availability: availability.into(),
            message_type: message_type.as_str().to_string(),
            callback_url: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    fn to_request(&self) -> Result<MessageRequest<'_>> {
        if self.recipients.is_empty() {
            return Err(Error::invalid_argument("Missing recipients!"));
        }

        let availability = coerce_availability(&self.availability)
            .filter(|seconds| *seconds >= 1)
            .ok_or_else(|| {
                Error::invalid_argument("Availability must be an integer greater than 0.")
            })?;

        let message_type: MessageType = self.message_type.parse().map_err(|_| {
            Error::invalid_argument(format!("Invalid message type {}.", self.message_type))
        })?;

        Ok(MessageRequest {
            recipients: &self.recipients,
            subject: self.subject.as_deref(),
            body: self.body.as_deref(),
            availability,
            message_type,
            callback_url: self.callback_url.as_deref(),
        })
    }
}

/// Body of `POST /frontend/messages`. Absent optional fields go out as `null`.
#[derive(Serialize)]
struct MessageRequest<'a> {
    recipients: &'a [String],
    subject: Option<&'a str>,
    body: Option<&'a str>,
    availability: i64,
    #[serde(rename = "type")]
    message_type: MessageType,
    #[serde(rename = "callbackUrl")]
    callback_url: Option<&'a str>,
}

fn coerce_availability(value: &Value) -> Option<i64> {
    match value {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64),
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Identifier of an existing message: a raw id, or a map holding `messageId`.
/// Numeric ids are used in their decimal form; any other JSON value resolves to no id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRef(Option<String>);

impl MessageRef {
    pub fn message_id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for MessageRef {
    fn from(id: &str) -> Self {
        MessageRef(Some(id.to_string()))
    }
}

impl From<String> for MessageRef {
    fn from(id: String) -> Self {
        MessageRef(Some(id))
    }
}

impl From<&String> for MessageRef {
    fn from(id: &String) -> Self {
        MessageRef(Some(id.clone()))
    }
}

impl From<Option<&str>> for MessageRef {
    fn from(id: Option<&str>) -> Self {
        MessageRef(id.map(str::to_string))
    }
}

impl From<Option<String>> for MessageRef {
    fn from(id: Option<String>) -> Self {
        MessageRef(id)
    }
}

impl From<&Value> for MessageRef {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(id) => MessageRef(Some(id.clone())),
            Value::Number(id) => MessageRef(Some(id.to_string())),
            Value::Object(map) => match map.get("messageId") {
                Some(Value::String(id)) => MessageRef(Some(id.clone())),
                Some(Value::Number(id)) => MessageRef(Some(id.to_string())),
                _ => MessageRef(None),
            },
            _ => MessageRef(None),
        }
    }
}

impl From<&HashMap<String, String>> for MessageRef {
    fn from(map: &HashMap<String, String>) -> Self {
        MessageRef(map.get("messageId").cloned())
    }
}

/// Client for the PassBy[ME] messaging API
pub struct Client {
    base_url: String,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Build a client with a mutual-TLS transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = base_url(&config)?;
        let (certificate, private_key) = config.credentials()?;
        let transport = HttpsTransport::new(
            certificate,
            private_key,
            config.trust_anchor(),
            &config.transport,
        )?;

        tracing::info!("PassBy[ME] client ready for {}", base_url);
        Ok(Self {
            base_url,
            transport: Box::new(transport),
        })
    }

    /// Build a client on a caller-supplied transport. The config is validated the same way.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        Ok(Self {
            base_url: base_url(&config)?,
            transport: Box::new(transport),
        })
    }

    /// `https://<host>` all requests go to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a new message and return its session
    pub async fn send_message(&self, params: &MessageParams) -> Result<SessionInfo<'_>> {
        let request = params.to_request()?;
        let body = serde_json::to_string(&request)?;

        let json = self.do_https(Method::POST, MESSAGES_PATH, Some(body)).await?;
        SessionInfo::from_json(&json, self)
    }

    /// Fetch the current state of a message
    pub async fn track_message(&self, message: impl Into<MessageRef>) -> Result<SessionInfo<'_>> {
        let message = message.into();
        let json = self
            .existing_message(Method::GET, message.message_id())
            .await?;
        SessionInfo::from_json(&json, self)
    }

    /// Cancel a message and return its final state
    pub async fn cancel_message(&self, message: impl Into<MessageRef>) -> Result<SessionInfo<'_>> {
        let message = message.into();
        let json = self
            .existing_message(Method::DELETE, message.message_id())
            .await?;
        SessionInfo::from_json(&json, self)
    }

    /// Fetch the current state of an existing handle, updating it in place
    pub async fn track_session(&self, session: &mut SessionInfo<'_>) -> Result<()> {
        let json = self
            .existing_message(Method::GET, Some(session.message_id()))
            .await?;
        session.re_initialize(&json)
    }

    /// Cancel the message behind an existing handle, updating it in place
    pub async fn cancel_session(&self, session: &mut SessionInfo<'_>) -> Result<()> {
        let json = self
            .existing_message(Method::DELETE, Some(session.message_id()))
            .await?;
        session.re_initialize(&json)
    }

    async fn existing_message(&self, method: Method, message_id: Option<&str>) -> Result<Value> {
        let message_id = match message_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(Error::invalid_argument("Empty message id!")),
        };

        let path = format!("{}/{}", MESSAGES_PATH, urlencoding::encode(message_id));
        self.do_https(method, &path, None).await
    }

    async fn do_https(&self, method: Method, path: &str, body: Option<String>) -> Result<Value> {
        let mut headers = HeaderMap::new();
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        };
        tracing::debug!("→ {} {}", request.method, request.url);

        let response = self.transport.execute(request).await?;
        tracing::debug!(
            "← {} ({} bytes)",
            response.status,
            response.body.as_ref().map_or(0, String::len)
        );

        let body = classify_response(response)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MessageOperations for Client {
    async fn track(&self, message_id: &str) -> Result<Value> {
        self.existing_message(Method::GET, Some(message_id)).await
    }

    async fn cancel(&self, message_id: &str) -> Result<Value> {
        self.existing_message(Method::DELETE, Some(message_id)).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn base_url(config: &ClientConfig) -> Result<String> {
    config.credentials()?;
    Ok(format!("https://{}", config.host()?))
}

/// Body of a successful response, or the error the response stands for
fn classify_response(response: HttpResponse) -> Result<String> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    match body {
        Some(body) if status.is_success() => Ok(body),
        Some(body) if status.as_u16() == SERVICE_ERROR_STATUS => {
            let payload: Value = serde_json::from_str(&body)?;
            tracing::warn!("PassBy[ME] error response: {}", payload);
            Err(Error::Service { payload })
        }
        body => {
            tracing::warn!("HTTP error {} (body present: {})", status, body.is_some());
            Err(Error::Transport {
                response: HttpResponse {
                    status,
                    headers,
                    body,
                },
            })
        }
    }
}
