use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account::errors::EventSinkError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountDirectory;
use crate::domain::account::ports::EventSink;
use crate::domain::events::Event;
use crate::domain::events::EventPayload;

/// Sink that records each event to the tracing subscriber.
///
/// Only the envelope fields are logged; payload bodies stay out of the logs
/// because account events carry derived keys and salts.
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for TracingEventSink {
    async fn consume(&self, event: &Event) -> Result<(), EventSinkError> {
        tracing::info!(
            event_type = event.type_tag(),
            event_id = %event.event_id,
            timestamp = %event.timestamp,
            "event consumed",
        );
        Ok(())
    }
}

/// Sink that projects account lifecycle events onto an [`AccountDirectory`].
///
/// `AccountCreated` inserts the account, `AccountDeleted` removes it; all
/// other events are acknowledged without effect.
pub struct DirectoryProjectionSink<D: AccountDirectory> {
    directory: Arc<D>,
}

impl<D: AccountDirectory> DirectoryProjectionSink<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D: AccountDirectory> EventSink for DirectoryProjectionSink<D> {
    async fn consume(&self, event: &Event) -> Result<(), EventSinkError> {
        match &event.payload {
            EventPayload::AccountCreated(payload) => {
                let account = Account {
                    id: AccountId(payload.account_id),
                    username: payload.username.clone(),
                    email: payload.email.clone(),
                    derived_key: payload.derived_key.clone(),
                    salt: payload.salt.clone(),
                    created_at: event.timestamp,
                };
                self.directory
                    .insert(account)
                    .await
                    .map_err(|e| EventSinkError::ConsumeFailed(e.to_string()))?;
                Ok(())
            }
            EventPayload::AccountDeleted(payload) => {
                self.directory
                    .delete(&AccountId(payload.account_id))
                    .await
                    .map_err(|e| EventSinkError::ConsumeFailed(e.to_string()))?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
