pub mod dispatcher;
pub mod errors;
pub mod models;
pub mod ports;

pub use dispatcher::CommandDispatcher;
pub use errors::DispatchError;
pub use models::Account;
pub use models::AccountId;
pub use ports::AccountDirectory;
pub use ports::EventSink;
