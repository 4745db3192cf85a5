pub mod gateway;
pub mod gemini_backend;

pub use gateway::{BackendGateway, GatewaySettings};
pub use gemini_backend::GeminiBackend;
