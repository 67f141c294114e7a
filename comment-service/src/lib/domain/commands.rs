use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::WireError;

/// Intent to create a new account.
///
/// Carries the cleartext password in transit; the Debug form redacts it so
/// the command can never leak it through logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for CreateAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Intent to delete an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccount {
    pub account_id: Uuid,
}

/// Intent to log into an account by email or username.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAccount {
    pub email_or_username: String,
    pub password: String,
}

impl fmt::Debug for LoginAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginAccount")
            .field("email_or_username", &self.email_or_username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Intent to open a comment thread for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentThread {
    pub page_url: String,
    pub title: String,
}

/// Intent to post a comment, optionally as a reply to a parent comment.
///
/// An absent parent means a top-level comment and is omitted from the wire
/// form entirely; it is never encoded as a zero-valued id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub comment_thread_id: Uuid,
    pub account_id: Uuid,
}

/// Intent to delete a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteComment {
    pub comment_id: Uuid,
    pub account_id: Uuid,
}

/// Closed union of every command the service accepts on the wire.
///
/// Dispatch and codec sites match exhaustively, so adding a variant is a
/// compile error until every site handles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateAccount(CreateAccount),
    DeleteAccount(DeleteAccount),
    LoginAccount(LoginAccount),
    CreateCommentThread(CreateCommentThread),
    CreateComment(CreateComment),
    DeleteComment(DeleteComment),
}

/// Wire envelope: tag plus an opaque payload region.
///
/// Decoding is two-phase: the envelope is parsed first, then the payload
/// region is decoded into the variant selected by the tag.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandEnvelope {
    command_type: String,
    payload: serde_json::Value,
}

impl Command {
    /// Wire tag naming this command's variant.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Command::CreateAccount(_) => "CreateAccount",
            Command::DeleteAccount(_) => "DeleteAccount",
            Command::LoginAccount(_) => "LoginAccount",
            Command::CreateCommentThread(_) => "CreateCommentThread",
            Command::CreateComment(_) => "CreateComment",
            Command::DeleteComment(_) => "DeleteComment",
        }
    }

    /// Encode the command into its wire envelope.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let payload = match self {
            Command::CreateAccount(p) => serde_json::to_value(p),
            Command::DeleteAccount(p) => serde_json::to_value(p),
            Command::LoginAccount(p) => serde_json::to_value(p),
            Command::CreateCommentThread(p) => serde_json::to_value(p),
            Command::CreateComment(p) => serde_json::to_value(p),
            Command::DeleteComment(p) => serde_json::to_value(p),
        }
        .map_err(|e| WireError::Malformed(e.to_string()))?;

        let envelope = CommandEnvelope {
            command_type: self.type_tag().to_string(),
            payload,
        };
        serde_json::to_vec(&envelope).map_err(|e| WireError::Malformed(e.to_string()))
    }

    /// Decode a wire envelope into a command.
    ///
    /// # Errors
    /// * `UnknownTypeTag` - The envelope names a tag this service does not
    ///   know; no partial decode is attempted
    /// * `Malformed` - The envelope or payload region is not valid
    pub fn decode(input: &[u8]) -> Result<Self, WireError> {
        let envelope: CommandEnvelope =
            serde_json::from_slice(input).map_err(|e| WireError::Malformed(e.to_string()))?;

        match envelope.command_type.as_str() {
            "CreateAccount" => Ok(Command::CreateAccount(decode_payload(envelope.payload)?)),
            "DeleteAccount" => Ok(Command::DeleteAccount(decode_payload(envelope.payload)?)),
            "LoginAccount" => Ok(Command::LoginAccount(decode_payload(envelope.payload)?)),
            "CreateCommentThread" => Ok(Command::CreateCommentThread(decode_payload(
                envelope.payload,
            )?)),
            "CreateComment" => Ok(Command::CreateComment(decode_payload(envelope.payload)?)),
            "DeleteComment" => Ok(Command::DeleteComment(decode_payload(envelope.payload)?)),
            other => Err(WireError::UnknownTypeTag(other.to_string())),
        }
    }
}

fn decode_payload<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, WireError> {
    serde_json::from_value(payload).map_err(|e| WireError::Malformed(e.to_string()))
}
