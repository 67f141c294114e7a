pub mod codec;
pub mod errors;

pub use codec::CredentialCodec;
pub use codec::KdfParams;
pub use errors::CredentialError;
