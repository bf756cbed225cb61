use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReplyError;

#[derive(Debug, Deserialize)]
pub struct HelloQuery {
    pub name: Option<String>,
}

/// Body of `POST /replyemail` exactly as the caller sent it.
#[derive(Debug, Deserialize)]
struct RawReplyRequest {
    subject: Option<String>,
    body: Option<String>,
    sender_name: Option<String>,
    sender_email: Option<String>,
    recipient_name: Option<String>,
}

/// A reply request whose required fields are known to be present and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingReplyRequest {
    pub subject: String,
    pub body: String,
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub recipient_name: Option<String>,
}

impl IncomingReplyRequest {
    /// Decodes and validates a raw request body.
    ///
    /// Anything that is not a JSON object of string (or null) fields is a
    /// [`ReplyError::MalformedBody`]. A missing, null or empty `subject`,
    /// `body` or `sender_name` is a [`ReplyError::MissingField`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ReplyError> {
        let value: Value = serde_json::from_slice(bytes).map_err(malformed)?;

        if !value.is_object() {
            warn!("Error parsing request body: expected a JSON object");
            return Err(ReplyError::MalformedBody);
        }

        let raw: RawReplyRequest = serde_json::from_value(value).map_err(malformed)?;

        Self::validate(raw)
    }

    fn validate(raw: RawReplyRequest) -> Result<Self, ReplyError> {
        let required = |field: Option<String>| non_empty(field).ok_or(ReplyError::MissingField);

        Ok(Self {
            subject: required(raw.subject)?,
            body: required(raw.body)?,
            sender_name: required(raw.sender_name)?,
            sender_email: non_empty(raw.sender_email),
            recipient_name: non_empty(raw.recipient_name),
        })
    }
}

fn malformed(e: serde_json::Error) -> ReplyError {
    warn!("Error parsing request body: {}", e);
    ReplyError::MalformedBody
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply_subject: String,
    pub reply_body: String,
}

impl ReplyResponse {
    pub fn new(subject: &str, reply_body: String) -> Self {
        Self {
            reply_subject: format!("Re: {}", subject),
            reply_body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}
