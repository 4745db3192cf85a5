pub mod atomic_file;
pub mod secret_storage;

pub use atomic_file::{AtomicFile, AtomicFileError, DocumentFormat};
pub use secret_storage::{API_KEY_ENV, SecretStorage, SecretStorageError};
