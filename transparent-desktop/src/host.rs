//! Host adapters for the headless binary.
//!
//! Screen capture and file picking shell out to the commands configured under
//! `[host]` in `config.toml`; window effects are only logged.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use transparent_core::capture::{
    CaptureError, CapturedFrame, FilePicker, ScreenSource, ScreenSourceInfo,
};
use transparent_core::window::{WindowGeometry, WindowSurface};

/// One screen, captured by a command that writes a PNG to stdout.
///
/// Without a configured command there are no sources at all.
pub struct CommandScreenSource {
    argv: Option<Vec<String>>,
}

impl CommandScreenSource {
    pub fn new(argv: Option<Vec<String>>) -> Self {
        Self {
            argv: argv.filter(|argv| !argv.is_empty()),
        }
    }
}

#[async_trait]
impl ScreenSource for CommandScreenSource {
    async fn list_sources(&self) -> Result<Vec<ScreenSourceInfo>, CaptureError> {
        Ok(match &self.argv {
            Some(_) => vec![ScreenSourceInfo {
                id: "screen:0".to_string(),
                name: "Entire screen".to_string(),
            }],
            None => Vec::new(),
        })
    }

    async fn capture(&self, _source: &ScreenSourceInfo) -> Result<CapturedFrame, CaptureError> {
        let argv = self
            .argv
            .as_ref()
            .ok_or_else(|| CaptureError::Source("no screenshot command configured".into()))?;

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .await
            .map_err(|e| CaptureError::Source(format!("failed to run {}: {}", argv[0], e)))?;

        if !output.status.success() {
            return Err(CaptureError::Source(format!(
                "{} exited with {}",
                argv[0], output.status
            )));
        }

        Ok(CapturedFrame::Png(output.stdout))
    }
}

/// File selection through a command that prints the chosen path.
///
/// A non-zero exit or empty output means the user cancelled.
pub struct CommandFilePicker {
    argv: Option<Vec<String>>,
}

impl CommandFilePicker {
    pub fn new(argv: Option<Vec<String>>) -> Self {
        Self {
            argv: argv.filter(|argv| !argv.is_empty()),
        }
    }
}

#[async_trait]
impl FilePicker for CommandFilePicker {
    async fn pick_file(&self) -> Option<PathBuf> {
        let Some(argv) = &self.argv else {
            tracing::warn!("No file picker command configured");
            return None;
        };

        let output = match Command::new(&argv[0]).args(&argv[1..]).output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Failed to run file picker {}: {}", argv[0], e);
                return None;
            }
        };

        if !output.status.success() {
            return None;
        }

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }
}

/// Window surface that records every change in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSurface;

impl WindowSurface for LoggingSurface {
    fn apply_bounds(&self, geometry: &WindowGeometry) {
        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            x = geometry.x,
            y = geometry.y,
            "Window bounds"
        );
    }

    fn set_visible(&self, visible: bool) {
        tracing::info!(visible, "Window visibility");
    }

    fn set_content_protection(&self, enabled: bool) {
        tracing::info!(enabled, "Window content protection");
    }
}
