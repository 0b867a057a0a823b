pub mod cursor_lookup;
pub mod sync;

use serde::{Deserialize, Serialize};

pub use cursor_lookup::{closest_index, nearest_non_null_index};
pub use sync::{
    BusEvent, CursorBus, CursorEvent, CursorStream, CursorSyncCoordinator, DEFAULT_BUS_CAPACITY,
    EventKind, HoverTarget, LegacyGraphHover, LegacyHoverPosition, OriginId, Throttle,
    XDomainSource,
};

/// Degree of hover sharing between chart instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncMode {
    /// No publishing, no subscribing.
    #[default]
    Off,
    /// Mirror the cursor position only.
    Crosshair,
    /// Mirror the position and the hovered values.
    Tooltip,
}

pub const DEFAULT_HOVER_PROXIMITY_PX: f64 = 15.0;
pub const DEFAULT_SYNC_THROTTLE_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CursorOptions {
    /// Maximum pixel distance for snapping a null hover to a neighbor.
    pub hover_proximity_px: f64,
    /// Minimum interval between published hover events.
    pub sync_throttle_ms: u64,
    pub sync: SyncMode,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            hover_proximity_px: DEFAULT_HOVER_PROXIMITY_PX,
            sync_throttle_ms: DEFAULT_SYNC_THROTTLE_MS,
            sync: SyncMode::Off,
        }
    }
}

impl CursorOptions {
    #[must_use]
    pub fn with_sync(mut self, sync: SyncMode) -> Self {
        self.sync = sync;
        self
    }
}

/// Hover state owned by one chart instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CursorState {
    /// Cursor x in plot pixels; `None` when cleared.
    pub left: Option<f64>,
    pub top: Option<f64>,
    /// Hovered row of the aligned frame.
    pub data_index: Option<usize>,
    /// Row shown for each value series, in series order.
    pub series_indices: Vec<usize>,
    pub show_tooltip: bool,
    /// `true` when the state mirrors another instance's pointer.
    pub remote: bool,
}

impl CursorState {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.left.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
