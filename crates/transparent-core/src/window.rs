//! Overlay window geometry and the native window seam.

use serde::{Deserialize, Serialize};

/// Position, size and the two state axes of the overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub expanded: bool,
    pub visible: bool,
}

impl WindowGeometry {
    /// Vertical coordinate of the bottom edge, kept fixed on expansion.
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }
}

/// Read-only snapshot handed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    #[serde(flatten)]
    pub geometry: WindowGeometry,
    /// Excluded from screen capture and window switchers.
    pub content_protected: bool,
}

/// The native window, driven by the window state machine.
///
/// Calls are made after the state machine has committed the new state.
pub trait WindowSurface: Send + Sync {
    fn apply_bounds(&self, geometry: &WindowGeometry);

    fn set_visible(&self, visible: bool);

    fn set_content_protection(&self, enabled: bool);
}

/// Surface for hosts without a native window.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSurface;

impl WindowSurface for DetachedSurface {
    fn apply_bounds(&self, _geometry: &WindowGeometry) {}

    fn set_visible(&self, _visible: bool) {}

    fn set_content_protection(&self, _enabled: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_flattens_geometry() {
        let snapshot = WindowSnapshot {
            geometry: WindowGeometry {
                width: 600,
                height: 50,
                x: 100,
                y: 950,
                expanded: false,
                visible: true,
            },
            content_protected: false,
        };
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["height"], 50);
        assert_eq!(json["contentProtected"], false);
        assert_eq!(snapshot.geometry.bottom(), 1000);
    }
}
