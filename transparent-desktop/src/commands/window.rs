use transparent_core::window::WindowSnapshot;

use crate::app::AppState;

pub fn toggle_window(state: &AppState) -> WindowSnapshot {
    state.orchestrator.window().toggle()
}

pub fn get_window_state(state: &AppState) -> WindowSnapshot {
    state.orchestrator.window().snapshot()
}

/// Hides the overlay from screen capture and window switchers.
pub fn set_content_protection(state: &AppState, enabled: bool) -> WindowSnapshot {
    state.orchestrator.window().set_content_protection(enabled)
}

pub fn show_window(state: &AppState) -> WindowSnapshot {
    state.orchestrator.window().show()
}

pub fn hide_window(state: &AppState) -> WindowSnapshot {
    state.orchestrator.window().hide()
}
