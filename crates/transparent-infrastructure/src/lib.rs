pub mod capture;
pub mod config_service;
pub mod conversation_repository;
pub mod paths;
pub mod storage;

pub use crate::capture::{ArtifactStore, AudioAdapter, FileAdapter, ScreenshotAdapter, StagedFile};
pub use crate::config_service::ConfigService;
pub use crate::conversation_repository::JsonConversationRepository;
pub use crate::paths::TransparentPaths;
pub use crate::storage::{SecretStorage, SecretStorageError};
