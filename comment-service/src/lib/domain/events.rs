use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::WireError;

/// Fact that a new account exists, carrying everything a projector needs to
/// persist it. The derived key and salt cross the wire base64-encoded and
/// must never be exposed outward by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreated {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "base64_bytes")]
    pub derived_key: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
}

/// Fact that an account was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeleted {
    pub account_id: Uuid,
}

/// Fact that an account logged in; carries the issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLoggedIn {
    pub account_id: Uuid,
    pub token: String,
}

/// Fact that a comment thread was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadCreated {
    pub comment_thread_id: Uuid,
    pub page_url: String,
    pub title: String,
}

/// Fact that a comment was posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreated {
    pub comment_id: Uuid,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub comment_thread_id: Uuid,
    pub account_id: Uuid,
}

/// Fact that a comment was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDeleted {
    pub comment_id: Uuid,
}

/// Closed union of every event this service can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    AccountCreated(AccountCreated),
    AccountDeleted(AccountDeleted),
    AccountLoggedIn(AccountLoggedIn),
    CommentThreadCreated(CommentThreadCreated),
    CommentCreated(CommentCreated),
    CommentDeleted(CommentDeleted),
}

impl EventPayload {
    /// Wire tag naming this payload's variant.
    pub fn type_tag(&self) -> &'static str {
        match self {
            // Historical tag; kept for wire compatibility with existing
            // consumers.
            EventPayload::AccountCreated(_) => "AccountCreatedEvent",
            EventPayload::AccountDeleted(_) => "AccountDeleted",
            EventPayload::AccountLoggedIn(_) => "AccountLoggedIn",
            EventPayload::CommentThreadCreated(_) => "CommentThreadCreated",
            EventPayload::CommentCreated(_) => "CommentCreated",
            EventPayload::CommentDeleted(_) => "CommentDeleted",
        }
    }
}

/// An emitted fact: payload plus event identity and a whole-second
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

/// Wire envelope: tag, metadata, and an opaque payload region.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventEnvelope {
    event_type: String,
    timestamp: DateTime<Utc>,
    event_id: Uuid,
    payload: serde_json::Value,
}

impl Event {
    /// Build an event for a payload, stamped now.
    ///
    /// Mints a fresh event id and truncates the timestamp to whole seconds.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now().trunc_subsecs(0),
            payload,
        }
    }

    /// Rebuild an event from its constituent parts.
    pub fn from_parts(event_id: Uuid, timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            event_id,
            timestamp,
            payload,
        }
    }

    /// Wire tag naming this event's variant.
    pub fn type_tag(&self) -> &'static str {
        self.payload.type_tag()
    }

    /// Encode the event into its wire envelope.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let payload = match &self.payload {
            EventPayload::AccountCreated(p) => serde_json::to_value(p),
            EventPayload::AccountDeleted(p) => serde_json::to_value(p),
            EventPayload::AccountLoggedIn(p) => serde_json::to_value(p),
            EventPayload::CommentThreadCreated(p) => serde_json::to_value(p),
            EventPayload::CommentCreated(p) => serde_json::to_value(p),
            EventPayload::CommentDeleted(p) => serde_json::to_value(p),
        }
        .map_err(|e| WireError::Malformed(e.to_string()))?;

        let envelope = EventEnvelope {
            event_type: self.type_tag().to_string(),
            timestamp: self.timestamp,
            event_id: self.event_id,
            payload,
        };
        serde_json::to_vec(&envelope).map_err(|e| WireError::Malformed(e.to_string()))
    }

    /// Decode a wire envelope into an event.
    ///
    /// # Errors
    /// * `UnknownTypeTag` - The envelope names a tag this service does not
    ///   know; no partial decode is attempted
    /// * `Malformed` - The envelope or payload region is not valid
    pub fn decode(input: &[u8]) -> Result<Self, WireError> {
        let envelope: EventEnvelope =
            serde_json::from_slice(input).map_err(|e| WireError::Malformed(e.to_string()))?;

        let payload = match envelope.event_type.as_str() {
            "AccountCreatedEvent" => EventPayload::AccountCreated(decode_payload(envelope.payload)?),
            "AccountDeleted" => EventPayload::AccountDeleted(decode_payload(envelope.payload)?),
            "AccountLoggedIn" => EventPayload::AccountLoggedIn(decode_payload(envelope.payload)?),
            "CommentThreadCreated" => {
                EventPayload::CommentThreadCreated(decode_payload(envelope.payload)?)
            }
            "CommentCreated" => EventPayload::CommentCreated(decode_payload(envelope.payload)?),
            "CommentDeleted" => EventPayload::CommentDeleted(decode_payload(envelope.payload)?),
            other => return Err(WireError::UnknownTypeTag(other.to_string())),
        };

        Ok(Event::from_parts(
            envelope.event_id,
            envelope.timestamp,
            payload,
        ))
    }
}

fn decode_payload<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, WireError> {
    serde_json::from_value(payload).map_err(|e| WireError::Malformed(e.to_string()))
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
