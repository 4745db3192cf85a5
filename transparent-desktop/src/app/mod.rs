pub mod bootstrap;
pub mod state;

pub use bootstrap::{AppBootstrap, HostAdapters};
pub use state::AppState;
