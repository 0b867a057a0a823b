use std::fmt;
use std::sync::Arc;

use crate::interaction::CursorState;

/// Renderer lifecycle events collaborators can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Init,
    SetCursor,
    SetSeries,
    SetLegend,
    SyncRect,
    SetScale,
}

/// Plot area in CSS pixels relative to the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Payload delivered with a hook event.
#[derive(Debug, Clone, PartialEq)]
pub enum HookPayload {
    Init { series_count: usize },
    SetCursor { cursor: CursorState },
    SetSeries { series_index: Option<usize>, focused: bool },
    SetLegend { data_index: Option<usize> },
    SyncRect { rect: Rect },
    SetScale { key: String, min: f64, max: f64 },
}

impl HookPayload {
    #[must_use]
    pub fn event(&self) -> HookEvent {
        match self {
            Self::Init { .. } => HookEvent::Init,
            Self::SetCursor { .. } => HookEvent::SetCursor,
            Self::SetSeries { .. } => HookEvent::SetSeries,
            Self::SetLegend { .. } => HookEvent::SetLegend,
            Self::SyncRect { .. } => HookEvent::SyncRect,
            Self::SetScale { .. } => HookEvent::SetScale,
        }
    }
}

pub type HookFn = Arc<dyn Fn(&HookPayload) + Send + Sync>;

/// Ordered list of hook callbacks.
///
/// Hooks observe lifecycle events; they cannot reach back into the
/// configuration they are registered on.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<(HookEvent, HookFn)>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl HookRegistry {
    pub fn register(
        &mut self,
        event: HookEvent,
        hook: impl Fn(&HookPayload) + Send + Sync + 'static,
    ) {
        self.hooks.push((event, Arc::new(hook)));
    }

    /// Calls every hook registered for the payload's event, in registration
    /// order. Returns how many ran.
    pub fn dispatch(&self, payload: &HookPayload) -> usize {
        let event = payload.event();
        let mut invoked = 0;
        for (registered, hook) in &self.hooks {
            if *registered == event {
                hook(payload);
                invoked += 1;
            }
        }
        invoked
    }

    #[must_use]
    pub fn count(&self, event: HookEvent) -> usize {
        self.hooks
            .iter()
            .filter(|(registered, _)| *registered == event)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
