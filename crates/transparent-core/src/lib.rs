pub mod backend;
pub mod capture;
pub mod config;
pub mod conversation;
pub mod encoding;
pub mod error;
pub mod media;
pub mod message;
pub mod outcome;
pub mod request;
pub mod window;

// Re-export common error types
pub use error::{ErrorKind, TransparentError};
