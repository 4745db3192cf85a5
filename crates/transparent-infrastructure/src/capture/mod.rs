//! The three capture adapters and their artifact persistence.

pub mod artifact_store;
pub mod audio;
pub mod file;
pub mod naming;
pub mod screenshot;

pub use artifact_store::ArtifactStore;
pub use audio::AudioAdapter;
pub use file::{FileAdapter, StagedFile};
pub use screenshot::ScreenshotAdapter;
