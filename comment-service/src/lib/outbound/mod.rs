pub mod sinks;

pub use sinks::DirectoryProjectionSink;
pub use sinks::TracingEventSink;
