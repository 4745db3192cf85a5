use std::sync::Arc;

use tokio::sync::Mutex;
use transparent_application::Orchestrator;
use transparent_core::config::AppConfig;
use transparent_core::conversation::ConversationRepository;
use transparent_infrastructure::{ConfigService, SecretStorage};

/// Application state shared across control channel commands.
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub conversation_repository: Arc<dyn ConversationRepository>,
    pub config_service: Arc<ConfigService>,
    pub secret_storage: Arc<SecretStorage>,
    pub config: Mutex<AppConfig>,
}
