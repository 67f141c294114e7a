use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use auth::CredentialCodec;
use auth::TokenService;

use crate::domain::account::errors::DispatchError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountDirectory;
use crate::domain::account::ports::EventSink;
use crate::domain::commands::Command;
use crate::domain::errors::WireError;
use crate::domain::events::AccountCreated;
use crate::domain::events::AccountDeleted;
use crate::domain::events::AccountLoggedIn;
use crate::domain::events::Event;
use crate::domain::events::EventPayload;

/// Routes typed commands to typed facts.
///
/// Orchestrates the credential codec, the token service, and the account
/// directory to produce at most one event per command, and forwards that
/// event to the sink before returning. Holds no mutable state of its own; a
/// single instance serves concurrent dispatch calls.
pub struct CommandDispatcher<D, S>
where
    D: AccountDirectory,
    S: EventSink,
{
    directory: Arc<D>,
    sink: Arc<S>,
    credentials: CredentialCodec,
    tokens: TokenService,
}

impl<D, S> CommandDispatcher<D, S>
where
    D: AccountDirectory,
    S: EventSink,
{
    /// Create a new dispatcher with injected collaborators.
    pub fn new(
        directory: Arc<D>,
        sink: Arc<S>,
        credentials: CredentialCodec,
        tokens: TokenService,
    ) -> Self {
        Self {
            directory,
            sink,
            credentials,
            tokens,
        }
    }

    /// Decode a command envelope and dispatch it.
    ///
    /// # Errors
    /// * `UnsupportedCommand` - The envelope names a tag this dispatcher
    ///   does not know
    /// * Everything `dispatch` can return
    pub async fn dispatch_raw(&self, input: &[u8]) -> Result<Option<Event>, DispatchError> {
        let command = Command::decode(input).map_err(|e| match e {
            WireError::UnknownTypeTag(tag) => DispatchError::UnsupportedCommand(tag),
            other => DispatchError::Wire(other),
        })?;
        self.dispatch(command).await
    }

    /// Handle a single command, producing at most one event.
    ///
    /// Thread and comment commands are deliberately passed through
    /// unhandled: the comment side of the system owns them, so they yield
    /// `Ok(None)` rather than an error.
    ///
    /// # Errors
    /// * `AccountNotFound` - DeleteAccount or LoginAccount targets an
    ///   account the directory does not know
    /// * `InvalidCredentials` - LoginAccount password does not verify
    /// * `Credential` / `Token` - Crypto machinery failed
    /// * `Directory` - Lookup failed, or a uniqueness conflict propagated
    /// * `Sink` - The produced event was not accepted
    pub async fn dispatch(&self, command: Command) -> Result<Option<Event>, DispatchError> {
        match command {
            Command::CreateAccount(payload) => {
                let salt = self.credentials.generate_salt()?;
                let derived_key = self
                    .credentials
                    .derive_key(payload.password.as_bytes(), &salt)?;

                self.emit(EventPayload::AccountCreated(AccountCreated {
                    account_id: Uuid::new_v4(),
                    username: payload.username,
                    email: payload.email,
                    derived_key,
                    salt,
                }))
                .await
                .map(Some)
            }
            Command::DeleteAccount(payload) => {
                let account = self
                    .directory
                    .find_by_id(&AccountId(payload.account_id))
                    .await?
                    .ok_or_else(|| {
                        DispatchError::AccountNotFound(payload.account_id.to_string())
                    })?;

                self.emit(EventPayload::AccountDeleted(AccountDeleted {
                    account_id: account.id.0,
                }))
                .await
                .map(Some)
            }
            Command::LoginAccount(payload) => {
                let account = self
                    .find_by_email_or_username(&payload.email_or_username)
                    .await?;

                let verified = self.credentials.verify(
                    payload.password.as_bytes(),
                    &account.salt,
                    &account.derived_key,
                )?;
                if !verified {
                    return Err(DispatchError::InvalidCredentials);
                }

                let token = self.tokens.issue_for_login(account.id.0, Utc::now())?;
                self.emit(EventPayload::AccountLoggedIn(AccountLoggedIn {
                    account_id: account.id.0,
                    token,
                }))
                .await
                .map(Some)
            }
            Command::CreateCommentThread(_) | Command::CreateComment(_)
            | Command::DeleteComment(_) => {
                tracing::debug!(
                    command_type = command.type_tag(),
                    "command not handled by accounts, passing through"
                );
                Ok(None)
            }
        }
    }

    async fn find_by_email_or_username(
        &self,
        email_or_username: &str,
    ) -> Result<Account, DispatchError> {
        if let Some(account) = self.directory.find_by_email(email_or_username).await? {
            return Ok(account);
        }
        self.directory
            .find_by_username(email_or_username)
            .await?
            .ok_or_else(|| DispatchError::AccountNotFound(email_or_username.to_string()))
    }

    async fn emit(&self, payload: EventPayload) -> Result<Event, DispatchError> {
        let event = Event::new(payload);
        self.sink.consume(&event).await?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::domain::account::errors::DirectoryError;
    use crate::domain::account::errors::EventSinkError;
    use crate::domain::commands::CreateAccount;
    use crate::domain::commands::CreateComment;
    use crate::domain::commands::CreateCommentThread;
    use crate::domain::commands::DeleteAccount;
    use crate::domain::commands::DeleteComment;
    use crate::domain::commands::LoginAccount;
    use auth::KdfParams;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    mock! {
        pub TestAccountDirectory {}

        #[async_trait]
        impl AccountDirectory for TestAccountDirectory {
            async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;
            async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError>;
            async fn insert(&self, account: Account) -> Result<Account, DirectoryError>;
            async fn delete(&self, id: &AccountId) -> Result<AccountId, DirectoryError>;
        }
    }

    mock! {
        pub TestEventSink {}

        #[async_trait]
        impl EventSink for TestEventSink {
            async fn consume(&self, event: &Event) -> Result<(), EventSinkError>;
        }
    }

    // Cheap work factors keep the suite fast without changing behaviour.
    fn codec() -> CredentialCodec {
        CredentialCodec::with_config(
            KdfParams {
                log_n: 4,
                block_size: 8,
                parallelism: 1,
                key_length: 32,
            },
            10,
        )
    }

    fn tokens() -> TokenService {
        TokenService::new(SECRET, Duration::hours(24), Duration::seconds(1))
    }

    fn dispatcher(
        directory: MockTestAccountDirectory,
        sink: MockTestEventSink,
    ) -> CommandDispatcher<MockTestAccountDirectory, MockTestEventSink> {
        CommandDispatcher::new(Arc::new(directory), Arc::new(sink), codec(), tokens())
    }

    fn stored_account(password: &str) -> Account {
        let codec = codec();
        let salt = codec.generate_salt().unwrap();
        let derived_key = codec.derive_key(password.as_bytes(), &salt).unwrap();
        Account {
            id: AccountId::new(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            derived_key,
            salt,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_account_emits_account_created() {
        let directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        sink.expect_consume()
            .withf(|event| match &event.payload {
                EventPayload::AccountCreated(p) => {
                    p.username == "testuser"
                        && p.email == "test@example.com"
                        && p.derived_key.len() == 32
                        && p.salt.len() == 10
                }
                _ => false,
            })
            .times(1)
            .returning(|_| Ok(()));

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::CreateAccount(CreateAccount {
                username: "testuser".to_string(),
                email: "test@example.com".to_string(),
                password: "unhashedPassword".to_string(),
            }))
            .await;

        let event = result.expect("Dispatch failed").expect("No event emitted");
        assert!(matches!(event.payload, EventPayload::AccountCreated(_)));
    }

    #[tokio::test]
    async fn test_delete_account_success() {
        let mut directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        let account = stored_account("unhashedPassword");
        let account_id = account.id;

        let returned = account.clone();
        directory
            .expect_find_by_id()
            .withf(move |id| *id == account_id)
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        sink.expect_consume()
            .withf(move |event| {
                matches!(
                    &event.payload,
                    EventPayload::AccountDeleted(p) if p.account_id == account_id.0
                )
            })
            .times(1)
            .returning(|_| Ok(()));

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::DeleteAccount(DeleteAccount {
                account_id: account_id.0,
            }))
            .await;

        assert!(result.expect("Dispatch failed").is_some());
    }

    #[tokio::test]
    async fn test_delete_account_not_found() {
        let mut directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        directory
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        sink.expect_consume().times(0);

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::DeleteAccount(DeleteAccount {
                account_id: Uuid::new_v4(),
            }))
            .await;

        assert!(matches!(result, Err(DispatchError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_login_success_token_validates_back() {
        let mut directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        let account = stored_account("unhashedPassword");
        let account_id = account.id;

        let returned = account.clone();
        directory
            .expect_find_by_email()
            .withf(|email| email == "test@example.com")
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        sink.expect_consume().times(1).returning(|_| Ok(()));

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::LoginAccount(LoginAccount {
                email_or_username: "test@example.com".to_string(),
                password: "unhashedPassword".to_string(),
            }))
            .await;

        let event = result.expect("Dispatch failed").expect("No event emitted");
        let EventPayload::AccountLoggedIn(payload) = &event.payload else {
            panic!("Expected AccountLoggedIn, got {:?}", event.payload);
        };
        assert_eq!(payload.account_id, account_id.0);

        let subject = tokens()
            .validate(&payload.token, Utc::now())
            .expect("Token validation failed");
        assert_eq!(subject, account_id.0);
    }

    #[tokio::test]
    async fn test_login_falls_back_to_username_lookup() {
        let mut directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        let account = stored_account("unhashedPassword");

        directory
            .expect_find_by_email()
            .withf(|email| email == "testuser")
            .times(1)
            .returning(|_| Ok(None));

        let returned = account.clone();
        directory
            .expect_find_by_username()
            .withf(|username| username == "testuser")
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        sink.expect_consume().times(1).returning(|_| Ok(()));

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::LoginAccount(LoginAccount {
                email_or_username: "testuser".to_string(),
                password: "unhashedPassword".to_string(),
            }))
            .await;

        assert!(result.expect("Dispatch failed").is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        let account = stored_account("unhashedPassword");

        let returned = account.clone();
        directory
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        // No event, no token.
        sink.expect_consume().times(0);

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::LoginAccount(LoginAccount {
                email_or_username: "test@example.com".to_string(),
                password: "wrongPassword".to_string(),
            }))
            .await;

        assert!(matches!(result, Err(DispatchError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_identity() {
        let mut directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        directory
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        directory
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        sink.expect_consume().times(0);

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::LoginAccount(LoginAccount {
                email_or_username: "nobody".to_string(),
                password: "unhashedPassword".to_string(),
            }))
            .await;

        assert!(matches!(result, Err(DispatchError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_comment_commands_pass_through() {
        let directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();
        sink.expect_consume().times(0);

        let dispatcher = dispatcher(directory, sink);

        let commands = vec![
            Command::CreateCommentThread(CreateCommentThread {
                page_url: "pageurl.com".to_string(),
                title: "title".to_string(),
            }),
            Command::CreateComment(CreateComment {
                data: "this is a comment".to_string(),
                parent_id: None,
                comment_thread_id: Uuid::new_v4(),
                account_id: Uuid::new_v4(),
            }),
            Command::DeleteComment(DeleteComment {
                comment_id: Uuid::new_v4(),
                account_id: Uuid::new_v4(),
            }),
        ];

        for command in commands {
            let result = dispatcher.dispatch(command).await;
            assert!(matches!(result, Ok(None)));
        }
    }

    #[tokio::test]
    async fn test_sink_failure_surfaces() {
        let directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();

        sink.expect_consume()
            .times(1)
            .returning(|_| Err(EventSinkError::ConsumeFailed("broker down".to_string())));

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch(Command::CreateAccount(CreateAccount {
                username: "testuser".to_string(),
                email: "test@example.com".to_string(),
                password: "unhashedPassword".to_string(),
            }))
            .await;

        assert!(matches!(result, Err(DispatchError::Sink(_))));
    }

    #[tokio::test]
    async fn test_dispatch_raw_unknown_tag() {
        let directory = MockTestAccountDirectory::new();
        let sink = MockTestEventSink::new();

        let dispatcher = dispatcher(directory, sink);

        let result = dispatcher
            .dispatch_raw(br#"{"commandType":"Frobnicate","payload":{}}"#)
            .await;

        match result {
            Err(DispatchError::UnsupportedCommand(tag)) => assert_eq!(tag, "Frobnicate"),
            other => panic!("Expected UnsupportedCommand, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_raw_round_trips_through_wire() {
        let directory = MockTestAccountDirectory::new();
        let mut sink = MockTestEventSink::new();
        sink.expect_consume().times(1).returning(|_| Ok(()));

        let dispatcher = dispatcher(directory, sink);

        let encoded = Command::CreateAccount(CreateAccount {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "unhashedPassword".to_string(),
        })
        .encode()
        .expect("Failed to encode command");

        let result = dispatcher.dispatch_raw(&encoded).await;
        assert!(result.expect("Dispatch failed").is_some());
    }
}
