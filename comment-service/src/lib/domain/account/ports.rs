use async_trait::async_trait;

use crate::domain::account::errors::DirectoryError;
use crate::domain::account::errors::EventSinkError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::events::Event;

/// Lookup and persistence port for accounts.
///
/// Implementations own storage and enforce username/email uniqueness;
/// latency and blocking behaviour are theirs, not the core's.
#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// Retrieve an account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError>;

    /// Retrieve an account by email address.
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;

    /// Retrieve an account by username.
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError>;

    /// Persist a new account.
    ///
    /// # Returns
    /// The account as stored
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Database` - Storage operation failed
    async fn insert(&self, account: Account) -> Result<Account, DirectoryError>;

    /// Remove an account.
    ///
    /// # Returns
    /// The id of the deleted account
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn delete(&self, id: &AccountId) -> Result<AccountId, DirectoryError>;
}

/// Consumer port for emitted events.
///
/// The dispatcher hands each produced event to exactly one consume call and
/// then discards it; persistence or projection is the sink's concern.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Consume a single event.
    ///
    /// # Errors
    /// * `SerializationFailed` - The event could not be encoded
    /// * `ConsumeFailed` - The sink could not accept the event
    async fn consume(&self, event: &Event) -> Result<(), EventSinkError>;
}
