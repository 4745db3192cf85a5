use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::Mutex;
use transparent_application::{CaptureAdapters, ConversationLog, Orchestrator, WindowStateMachine};
use transparent_core::backend::GenerativeBackend;
use transparent_core::capture::{FilePicker, ScreenSource};
use transparent_core::config::AppConfig;
use transparent_core::conversation::ConversationRepository;
use transparent_core::window::WindowSurface;
use transparent_infrastructure::{
    ArtifactStore, AudioAdapter, ConfigService, FileAdapter, JsonConversationRepository,
    ScreenshotAdapter, SecretStorage, TransparentPaths,
};
use transparent_interaction::{BackendGateway, GatewaySettings, GeminiBackend};

use crate::app::AppState;
use crate::host::{CommandFilePicker, CommandScreenSource, LoggingSurface};

/// Collaborators provided by the host environment.
pub struct HostAdapters {
    pub backend: Arc<dyn GenerativeBackend>,
    pub screen_source: Arc<dyn ScreenSource>,
    pub file_picker: Arc<dyn FilePicker>,
    pub surface: Arc<dyn WindowSurface>,
    /// Display work area height, when the host can report it.
    pub work_area_height: Option<i32>,
}

impl HostAdapters {
    /// Gemini over HTTP plus the command-based capture and picker adapters
    /// configured under `[host]`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let backend = GeminiBackend::new(
            config.gateway.base_url.clone(),
            Duration::from_secs(config.gateway.request_timeout_secs),
        )
        .map_err(|e| anyhow!("Failed to create Gemini client: {}", e))?;

        Ok(Self {
            backend: Arc::new(backend),
            screen_source: Arc::new(CommandScreenSource::new(
                config.host.screenshot_command.clone(),
            )),
            file_picker: Arc::new(CommandFilePicker::new(
                config.host.file_picker_command.clone(),
            )),
            surface: Arc::new(LoggingSurface),
            work_area_height: None,
        })
    }
}

pub struct AppBootstrap {
    pub app_state: AppState,
}

impl AppBootstrap {
    /// Loads `config.toml`, writing the defaults on first run.
    pub fn load_config(paths: &TransparentPaths) -> Result<AppConfig> {
        ConfigService::new(paths.config_file())
            .load_or_create()
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))
    }

    /// Wires storage, capture, gateway, window and orchestrator together.
    ///
    /// `env_api_key` takes precedence over `secret.json`. A missing key is
    /// logged, not fatal.
    pub fn initialize(
        paths: &TransparentPaths,
        config: AppConfig,
        env_api_key: Option<String>,
        host: HostAdapters,
    ) -> Result<Self> {
        let secret_storage = Arc::new(SecretStorage::with_path(paths.secret_file()));
        let api_key = secret_storage.resolve_api_key(env_api_key);
        if api_key.is_none() {
            tracing::warn!(
                "[Bootstrap] No Gemini API key configured; backend calls will fail until one is set"
            );
        }

        let gateway = Arc::new(BackendGateway::new(
            host.backend,
            GatewaySettings::from_config(&config.gateway, api_key),
        ));

        let window = Arc::new(WindowStateMachine::new(
            &config.window,
            host.work_area_height,
            host.surface,
        ));

        let captures = CaptureAdapters {
            screenshot: ScreenshotAdapter::new(
                host.screen_source,
                ArtifactStore::screenshots(paths.screenshots_dir()),
            ),
            audio: AudioAdapter::new(ArtifactStore::audio(paths.audio_dir())),
            files: FileAdapter::new(paths.uploads_dir()),
        };

        let conversation_repository: Arc<dyn ConversationRepository> =
            Arc::new(JsonConversationRepository::new(paths.conversations_file()));

        let orchestrator = Orchestrator::new(
            gateway,
            window,
            captures,
            host.file_picker,
            Arc::new(ConversationLog::new()),
        )
        .with_repository(Arc::clone(&conversation_repository));

        tracing::info!(
            "[Bootstrap] Ready (config: {}, data: {})",
            paths.config_dir().display(),
            paths.data_dir().display()
        );

        Ok(Self {
            app_state: AppState {
                orchestrator: Arc::new(orchestrator),
                conversation_repository,
                config_service: Arc::new(ConfigService::new(paths.config_file())),
                secret_storage,
                config: Mutex::new(config),
            },
        })
    }
}
