//! Host process for the chat overlay.
//!
//! The UI talks to [`channel::serve`] over newline-delimited JSON; every
//! operation is a thin command over the shared [`app::AppState`].

pub mod app;
pub mod channel;
pub mod commands;
pub mod host;
pub mod logging;
