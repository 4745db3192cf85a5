//! Overlay window state machine.
//!
//! Two independent axes: `Collapsed → Expanded` (one-shot, never reversed
//! within a process) and `Hidden ⇄ Shown`. Content protection is a third,
//! orthogonal flag. The state is owned here and mutated only through the
//! transitions below; everyone else reads [`WindowSnapshot`]s.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use transparent_core::config::WindowConfig;
use transparent_core::window::{WindowGeometry, WindowSnapshot, WindowSurface};

struct WindowState {
    geometry: WindowGeometry,
    content_protected: bool,
}

impl WindowState {
    fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            geometry: self.geometry,
            content_protected: self.content_protected,
        }
    }
}

pub struct WindowStateMachine {
    state: Mutex<WindowState>,
    expansion_delta: u32,
    surface: Arc<dyn WindowSurface>,
}

impl WindowStateMachine {
    /// Places the collapsed window `bottom_margin` above the bottom of the
    /// work area. `work_area_height` falls back to the configured value.
    pub fn new(
        config: &WindowConfig,
        work_area_height: Option<i32>,
        surface: Arc<dyn WindowSurface>,
    ) -> Self {
        let work_area = work_area_height.unwrap_or(config.work_area_height);
        let height = i32::try_from(config.height).unwrap_or(i32::MAX);
        let y = work_area
            .saturating_sub(height)
            .saturating_sub(config.bottom_margin)
            .max(0);

        let geometry = WindowGeometry {
            width: config.width,
            height: config.height,
            x: config.x,
            y,
            expanded: false,
            visible: true,
        };
        surface.apply_bounds(&geometry);

        Self {
            state: Mutex::new(WindowState {
                geometry,
                content_protected: false,
            }),
            expansion_delta: config.expansion_delta(),
            surface,
        }
    }

    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.lock().snapshot()
    }

    /// Grows the window upward by the expansion delta, once per process.
    ///
    /// Returns `true` only for the call that performed the expansion.
    pub fn expand_if_needed(&self) -> bool {
        let mut state = self.lock();
        if state.geometry.expanded {
            return false;
        }

        let before = state.geometry.bottom();
        let delta = i32::try_from(self.expansion_delta).unwrap_or(i32::MAX);
        let geometry = &mut state.geometry;
        geometry.height = geometry.height.saturating_add(self.expansion_delta);
        geometry.y = geometry.y.saturating_sub(delta);
        geometry.expanded = true;
        debug_assert_eq!(before, geometry.bottom());

        let geometry = *geometry;
        drop(state);

        info!(height = geometry.height, y = geometry.y, "Window expanded");
        self.surface.apply_bounds(&geometry);
        true
    }

    /// Flips visibility and returns the new snapshot.
    pub fn toggle(&self) -> WindowSnapshot {
        let visible = !self.lock().geometry.visible;
        self.set_visible(visible)
    }

    pub fn show(&self) -> WindowSnapshot {
        self.set_visible(true)
    }

    pub fn hide(&self) -> WindowSnapshot {
        self.set_visible(false)
    }

    fn set_visible(&self, visible: bool) -> WindowSnapshot {
        let snapshot = {
            let mut state = self.lock();
            state.geometry.visible = visible;
            state.snapshot()
        };
        debug!(visible, "Window visibility changed");
        self.surface.set_visible(visible);
        snapshot
    }

    pub fn set_content_protection(&self, enabled: bool) -> WindowSnapshot {
        let snapshot = {
            let mut state = self.lock();
            state.content_protected = enabled;
            state.snapshot()
        };
        debug!(enabled, "Content protection changed");
        self.surface.set_content_protection(enabled);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transparent_core::window::DetachedSurface;

    fn machine(config: &WindowConfig, work_area: Option<i32>) -> WindowStateMachine {
        WindowStateMachine::new(config, work_area, Arc::new(DetachedSurface))
    }

    #[test]
    fn test_initial_placement() {
        let window = machine(&WindowConfig::default(), Some(1000));
        let geometry = window.snapshot().geometry;

        assert_eq!(geometry.y, 1000 - 50 - 80);
        assert_eq!((geometry.width, geometry.height, geometry.x), (600, 50, 100));
        assert!(!geometry.expanded);
        assert!(geometry.visible);
    }

    #[test]
    fn test_initial_placement_clamps_at_zero() {
        let window = machine(&WindowConfig::default(), Some(20));
        assert_eq!(window.snapshot().geometry.y, 0);
    }

    #[test]
    fn test_expansion_keeps_bottom_edge() {
        let window = machine(&WindowConfig::default(), None);
        let before = window.snapshot().geometry;

        assert!(window.expand_if_needed());
        let after = window.snapshot().geometry;

        assert_eq!(after.height, 350);
        assert_eq!(after.y, before.y - 300);
        assert_eq!(after.bottom(), before.bottom());
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let window = machine(&WindowConfig::default(), None);

        assert!(window.expand_if_needed());
        let first = window.snapshot();
        for _ in 0..5 {
            assert!(!window.expand_if_needed());
        }

        assert_eq!(window.snapshot(), first);
    }

    #[test]
    fn test_bottom_edge_invariant_for_other_geometries() {
        for (height, expanded_height, margin) in [(10, 500, 0), (200, 210, 40), (80, 80, 5)] {
            let config = WindowConfig {
                height,
                expanded_height,
                bottom_margin: margin,
                ..Default::default()
            };
            let window = machine(&config, Some(2000));
            let before = window.snapshot().geometry.bottom();
            window.expand_if_needed();
            assert_eq!(window.snapshot().geometry.bottom(), before);
        }
    }

    #[test]
    fn test_visibility_is_independent_of_expansion() {
        let window = machine(&WindowConfig::default(), None);

        let hidden = window.toggle();
        assert!(!hidden.geometry.visible);
        assert!(!hidden.geometry.expanded);

        window.expand_if_needed();
        let shown = window.toggle();
        assert!(shown.geometry.visible);
        assert!(shown.geometry.expanded);

        assert!(!window.hide().geometry.visible);
        assert!(window.show().geometry.visible);
    }

    #[test]
    fn test_content_protection_flag() {
        let window = machine(&WindowConfig::default(), None);
        assert!(window.set_content_protection(true).content_protected);
        assert!(window.snapshot().content_protected);
        assert!(!window.snapshot().geometry.expanded);
    }
}
