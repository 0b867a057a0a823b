use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, trace};

use crate::core::{AlignedFrame, LinearScale, Orientation, Viewport};
use crate::error::{PlotError, PlotResult};

use super::cursor_lookup::{closest_index, nearest_non_null_index};
use super::{CursorOptions, CursorState, SyncMode};

pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Identifies the chart instance that emitted a bus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorEvent {
    pub data_index: Option<usize>,
    pub x_value: Option<f64>,
    pub y_value: Option<f64>,
    pub origin_id: OriginId,
}

/// Hover position carried by the older `graph-hover` event, in data units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyHoverPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyGraphHover {
    pub pos: LegacyHoverPosition,
    pub panel_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DataHover,
    DataHoverClear,
    LegacyGraphHover,
    LegacyGraphHoverClear,
}

impl EventKind {
    pub const ALL: [Self; 4] = [
        Self::DataHover,
        Self::DataHoverClear,
        Self::LegacyGraphHover,
        Self::LegacyGraphHoverClear,
    ];
}

/// Message carried on the shared cursor bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BusEvent {
    DataHover(CursorEvent),
    #[serde(rename_all = "camelCase")]
    DataHoverClear { origin_id: OriginId },
    #[serde(rename = "graph-hover")]
    LegacyGraphHover(LegacyGraphHover),
    #[serde(rename = "graph-hover-clear", rename_all = "camelCase")]
    LegacyGraphHoverClear { panel_id: u64 },
}

impl BusEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DataHover(_) => EventKind::DataHover,
            Self::DataHoverClear { .. } => EventKind::DataHoverClear,
            Self::LegacyGraphHover(_) => EventKind::LegacyGraphHover,
            Self::LegacyGraphHoverClear { .. } => EventKind::LegacyGraphHoverClear,
        }
    }

    /// Origin of the current event shapes; legacy events carry a panel id instead.
    #[must_use]
    pub fn origin(&self) -> Option<OriginId> {
        match self {
            Self::DataHover(event) => Some(event.origin_id),
            Self::DataHoverClear { origin_id } => Some(*origin_id),
            Self::LegacyGraphHover(_) | Self::LegacyGraphHoverClear { .. } => None,
        }
    }

    #[must_use]
    pub fn panel_id(&self) -> Option<u64> {
        match self {
            Self::LegacyGraphHover(hover) => Some(hover.panel_id),
            Self::LegacyGraphHoverClear { panel_id } => Some(*panel_id),
            Self::DataHover(_) | Self::DataHoverClear { .. } => None,
        }
    }

    #[must_use]
    pub fn is_clear(&self) -> bool {
        matches!(
            self,
            Self::DataHoverClear { .. } | Self::LegacyGraphHoverClear { .. }
        )
    }

    pub fn from_json_str(input: &str) -> PlotResult<Self> {
        serde_json::from_str(input)
            .map_err(|err| PlotError::InvalidData(format!("malformed bus event: {err}")))
    }
}

/// Process-wide multi-producer, multi-consumer cursor channel.
///
/// Clones share the same channel and origin allocator.
#[derive(Debug, Clone)]
pub struct CursorBus {
    sender: broadcast::Sender<BusEvent>,
    next_origin: Arc<AtomicU64>,
}

impl Default for CursorBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl CursorBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            next_origin: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Sends `event` to every live stream. Returns how many streams it
    /// reached; zero when nobody is listening.
    pub fn publish(&self, event: BusEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(reached) => {
                trace!(?kind, reached, "cursor event published");
                reached
            }
            Err(_) => {
                trace!(?kind, "cursor event dropped, no subscribers");
                0
            }
        }
    }

    /// Stream of every event kind.
    #[must_use]
    pub fn subscribe(&self) -> CursorStream {
        self.get_stream(&EventKind::ALL)
    }

    /// Stream limited to `kinds`. Dropping the stream releases the subscription.
    #[must_use]
    pub fn get_stream(&self, kinds: &[EventKind]) -> CursorStream {
        CursorStream {
            receiver: self.sender.subscribe(),
            kinds: kinds.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn allocate_origin(&self) -> OriginId {
        OriginId(self.next_origin.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub struct CursorStream {
    receiver: broadcast::Receiver<BusEvent>,
    kinds: SmallVec<[EventKind; 4]>,
}

impl CursorStream {
    fn accepts(&self, event: &BusEvent) -> bool {
        self.kinds.contains(&event.kind())
    }

    /// Next buffered event of a subscribed kind, without waiting.
    ///
    /// Events overwritten while the stream lagged are skipped.
    pub fn try_next(&mut self) -> Option<BusEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "cursor stream lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the next event of a subscribed kind. Returns `None` once
    /// every bus handle is gone.
    pub async fn next(&mut self) -> Option<BusEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "cursor stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// Coalesces bursts into at most one emission per window.
///
/// Items offered inside the window replace each other; only the latest is
/// kept and released by [`Throttle::flush`].
#[derive(Debug)]
pub struct Throttle<T> {
    window: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_emit: None,
            pending: None,
        }
    }

    fn is_open(&self, now: Instant) -> bool {
        match self.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        }
    }

    /// Returns `item` when it may be emitted now; otherwise keeps it pending.
    pub fn offer(&mut self, item: T, now: Instant) -> Option<T> {
        if self.is_open(now) {
            self.last_emit = Some(now);
            self.pending = None;
            Some(item)
        } else {
            self.pending = Some(item);
            None
        }
    }

    pub fn flush(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || !self.is_open(now) {
            return None;
        }
        self.last_emit = Some(now);
        self.pending.take()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Supplies the x domain to project against, read on every projection.
pub type XDomainSource = Arc<dyn Fn() -> (f64, f64) + Send + Sync>;

/// The aligned data and x projection a chart instance hovers over.
///
/// The x domain is resolved on each pixel conversion, so a moving time
/// window is followed without re-attaching.
#[derive(Clone)]
pub struct HoverTarget {
    frame: Arc<AlignedFrame>,
    x_values: Vec<f64>,
    x_domain: XDomainSource,
    y_scale: Option<LinearScale>,
    viewport: Viewport,
}

impl fmt::Debug for HoverTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverTarget")
            .field("rows", &self.x_values.len())
            .field("x_domain", &(self.x_domain)())
            .field("y_scale", &self.y_scale)
            .field("viewport", &self.viewport)
            .finish()
    }
}

impl HoverTarget {
    /// Target with a fixed x projection.
    #[must_use]
    pub fn new(frame: Arc<AlignedFrame>, x_scale: LinearScale, viewport: Viewport) -> Self {
        Self::with_x_domain(frame, Arc::new(move || x_scale.domain()), viewport)
    }

    #[must_use]
    pub fn with_x_domain(
        frame: Arc<AlignedFrame>,
        x_domain: XDomainSource,
        viewport: Viewport,
    ) -> Self {
        let x_values = frame.x_values();
        Self {
            frame,
            x_values,
            x_domain,
            y_scale: None,
            viewport,
        }
    }

    #[must_use]
    pub fn with_y_scale(mut self, y_scale: LinearScale) -> Self {
        self.y_scale = Some(y_scale);
        self
    }

    #[must_use]
    pub fn frame(&self) -> &AlignedFrame {
        &self.frame
    }

    /// Current x projection; `None` while the domain is degenerate.
    #[must_use]
    pub fn x_scale(&self) -> Option<LinearScale> {
        let (start, end) = (self.x_domain)();
        LinearScale::new(start, end, Orientation::Horizontal).ok()
    }

    fn x_to_pixel(&self, x: f64) -> Option<f64> {
        project_x(self.x_scale(), x, self.viewport)
    }

    fn pixel_to_x(&self, pixel: f64) -> Option<f64> {
        self.x_scale()?.pixel_to_value(pixel, self.viewport).ok()
    }

    fn y_to_pixel(&self, y: f64) -> Option<f64> {
        self.y_scale
            .and_then(|scale| scale.value_to_pixel(y, self.viewport).ok())
    }

    fn pixel_to_y(&self, pixel: f64) -> Option<f64> {
        self.y_scale
            .and_then(|scale| scale.pixel_to_value(pixel, self.viewport).ok())
    }

    fn contains_x_pixel(&self, pixel: f64) -> bool {
        pixel.is_finite() && pixel >= 0.0 && pixel <= f64::from(self.viewport.width)
    }

    /// Row shown for each value series when hovering `data_index` at `cursor_px`.
    fn series_rows(&self, data_index: usize, cursor_px: f64, proximity_px: f64) -> Vec<usize> {
        let x_scale = self.x_scale();
        self.frame
            .value_fields()
            .map(|(_, field)| {
                nearest_non_null_index(
                    &field.values,
                    &self.x_values,
                    data_index,
                    cursor_px,
                    proximity_px,
                    |x| project_x(x_scale, x, self.viewport),
                )
            })
            .collect()
    }
}

fn project_x(x_scale: Option<LinearScale>, x: f64, viewport: Viewport) -> Option<f64> {
    x_scale?.value_to_pixel(x, viewport).ok()
}

/// Keeps one chart instance's cursor in step with the others on a bus.
///
/// In [`SyncMode::Off`] the coordinator holds no subscription and never
/// publishes. Dropping it, or calling [`CursorSyncCoordinator::shutdown`],
/// releases its subscription.
///
/// Hover events inside a throttle window are held back, last one wins. The
/// host must call [`CursorSyncCoordinator::flush`] (for example from its
/// frame or timer tick) to publish that trailing event; [`poll`] only
/// receives.
///
/// [`poll`]: CursorSyncCoordinator::poll
#[derive(Debug)]
pub struct CursorSyncCoordinator {
    bus: CursorBus,
    origin: OriginId,
    panel_id: Option<u64>,
    options: CursorOptions,
    stream: Option<CursorStream>,
    throttle: Throttle<BusEvent>,
    target: Option<HoverTarget>,
    cursor: CursorState,
}

impl CursorSyncCoordinator {
    #[must_use]
    pub fn new(bus: &CursorBus, options: CursorOptions) -> Self {
        let stream = (options.sync != SyncMode::Off).then(|| bus.subscribe());
        Self {
            bus: bus.clone(),
            origin: bus.allocate_origin(),
            panel_id: None,
            options,
            stream,
            throttle: Throttle::new(Duration::from_millis(options.sync_throttle_ms)),
            target: None,
            cursor: CursorState::default(),
        }
    }

    /// Panel id used to ignore legacy events this panel emitted itself.
    #[must_use]
    pub fn with_panel_id(mut self, panel_id: u64) -> Self {
        self.panel_id = Some(panel_id);
        self
    }

    #[must_use]
    pub fn origin(&self) -> OriginId {
        self.origin
    }

    #[must_use]
    pub fn mode(&self) -> SyncMode {
        self.options.sync
    }

    #[must_use]
    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.stream.is_some()
    }

    pub fn set_mode(&mut self, mode: SyncMode) {
        self.options.sync = mode;
        if mode == SyncMode::Off {
            self.stream = None;
            self.throttle.cancel();
        } else if self.stream.is_none() {
            self.stream = Some(self.bus.subscribe());
        }
        debug!(origin = self.origin.0, ?mode, "cursor sync mode changed");
    }

    /// Replaces the hovered data, e.g. after a rebuild.
    pub fn attach(&mut self, target: HoverTarget) {
        self.target = Some(target);
    }

    pub fn on_pointer_move(&mut self, x_px: f64, y_px: f64) -> bool {
        self.on_pointer_move_at(x_px, y_px, Instant::now())
    }

    /// Updates the local cursor and publishes a hover event, subject to the
    /// throttle. Returns `true` when an event went onto the bus.
    pub fn on_pointer_move_at(&mut self, x_px: f64, y_px: f64, now: Instant) -> bool {
        let Some(target) = self.target.as_ref() else {
            self.cursor = CursorState {
                left: Some(x_px),
                top: Some(y_px),
                ..CursorState::default()
            };
            return false;
        };
        if !target.contains_x_pixel(x_px) {
            return self.on_pointer_leave_at(now);
        }

        let x_value = target.pixel_to_x(x_px);
        let data_index = x_value.and_then(|x| closest_index(&target.x_values, x));
        let series_indices = data_index
            .map(|index| target.series_rows(index, x_px, self.options.hover_proximity_px))
            .unwrap_or_default();
        let y_value = target.pixel_to_y(y_px);
        self.cursor = CursorState {
            left: Some(x_px),
            top: Some(y_px),
            data_index,
            series_indices,
            show_tooltip: data_index.is_some(),
            remote: false,
        };

        if self.options.sync == SyncMode::Off {
            return false;
        }
        let event = BusEvent::DataHover(CursorEvent {
            data_index,
            x_value,
            y_value,
            origin_id: self.origin,
        });
        match self.throttle.offer(event, now) {
            Some(event) => {
                self.bus.publish(event);
                true
            }
            None => {
                trace!(origin = self.origin.0, "hover event coalesced");
                false
            }
        }
    }

    pub fn on_pointer_leave(&mut self) -> bool {
        self.on_pointer_leave_at(Instant::now())
    }

    /// Clears the local cursor. Any pending throttled hover is dropped and a
    /// clear event is published immediately.
    pub fn on_pointer_leave_at(&mut self, _now: Instant) -> bool {
        self.cursor.clear();
        if self.options.sync == SyncMode::Off {
            return false;
        }
        self.throttle.cancel();
        self.bus.publish(BusEvent::DataHoverClear {
            origin_id: self.origin,
        });
        true
    }

    pub fn flush(&mut self) -> bool {
        self.flush_at(Instant::now())
    }

    /// Publishes the coalesced hover once its window has elapsed.
    pub fn flush_at(&mut self, now: Instant) -> bool {
        if self.options.sync == SyncMode::Off {
            return false;
        }
        match self.throttle.flush(now) {
            Some(event) => {
                self.bus.publish(event);
                true
            }
            None => false,
        }
    }

    /// Applies the latest remote event waiting on the bus. Returns `true`
    /// when the local cursor changed.
    pub fn poll(&mut self) -> bool {
        let origin = self.origin;
        let panel_id = self.panel_id;
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };

        let mut latest = None;
        while let Some(event) = stream.try_next() {
            let own = event.origin() == Some(origin)
                || (panel_id.is_some() && event.panel_id() == panel_id);
            if own {
                trace!(origin = origin.0, "ignoring own cursor event");
                continue;
            }
            latest = Some(event);
        }

        match latest {
            Some(event) => self.apply_remote(&event),
            None => false,
        }
    }

    fn apply_remote(&mut self, event: &BusEvent) -> bool {
        match event {
            BusEvent::DataHover(hover) => {
                self.mirror(hover.data_index, hover.x_value, hover.y_value)
            }
            BusEvent::LegacyGraphHover(hover) => {
                self.mirror(None, Some(hover.pos.x), Some(hover.pos.y))
            }
            BusEvent::DataHoverClear { .. } | BusEvent::LegacyGraphHoverClear { .. } => {
                self.clear_local()
            }
        }
    }

    fn clear_local(&mut self) -> bool {
        let changed = self.cursor != CursorState::default();
        self.cursor.clear();
        changed
    }

    fn mirror(
        &mut self,
        data_index: Option<usize>,
        x_value: Option<f64>,
        y_value: Option<f64>,
    ) -> bool {
        let Some(target) = self.target.as_ref() else {
            return self.clear_local();
        };

        let x_value = x_value
            .filter(|x| x.is_finite())
            .or_else(|| data_index.and_then(|index| target.x_values.get(index).copied()));
        let resolved = x_value.and_then(|x| {
            let pixel = target.x_to_pixel(x)?;
            let index = closest_index(&target.x_values, x)?;
            Some((pixel, index))
        });
        let Some((left, index)) = resolved.filter(|(pixel, _)| target.contains_x_pixel(*pixel))
        else {
            debug!(origin = self.origin.0, "remote cursor outside plot, clearing");
            return self.clear_local();
        };

        let top = y_value.and_then(|y| target.y_to_pixel(y));
        let next = match self.options.sync {
            SyncMode::Off => return false,
            SyncMode::Crosshair => CursorState {
                left: Some(left),
                top,
                data_index: Some(index),
                series_indices: Vec::new(),
                show_tooltip: false,
                remote: true,
            },
            SyncMode::Tooltip => CursorState {
                left: Some(left),
                top,
                data_index: Some(index),
                series_indices: target.series_rows(
                    index,
                    left,
                    self.options.hover_proximity_px,
                ),
                show_tooltip: true,
                remote: true,
            },
        };
        let changed = next != self.cursor;
        self.cursor = next;
        changed
    }

    /// Releases the bus subscription and forgets local state.
    pub fn shutdown(&mut self) {
        self.stream = None;
        self.throttle.cancel();
        self.cursor.clear();
    }
}
