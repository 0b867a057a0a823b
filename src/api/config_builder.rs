use indexmap::IndexMap;
use tracing::trace;

use crate::extensions::{HookEvent, HookPayload, HookRegistry};
use crate::interaction::{CursorOptions, SyncMode};

use super::scale_axis_builder::{AxisDescriptor, ScaleDescriptor};
use super::series_builder::SeriesDescriptor;
use super::stacking::Band;

/// Collects scales, axes, series, bands and cursor options for one build.
///
/// A builder is meant to be created per build; [`PlotConfigBuilder::get_config`]
/// snapshots what was added so far.
#[derive(Debug, Default)]
pub struct PlotConfigBuilder {
    scales: IndexMap<String, ScaleDescriptor>,
    axes: Vec<AxisDescriptor>,
    series: Vec<SeriesDescriptor>,
    bands: Vec<Band>,
    cursor: CursorOptions,
    hooks: HookRegistry,
}

impl PlotConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scale unless one with the same key exists. Returns `true`
    /// when added.
    pub fn add_scale(&mut self, scale: ScaleDescriptor) -> bool {
        if self.scales.contains_key(&scale.key) {
            trace!(key = %scale.key, "scale already registered");
            return false;
        }
        self.scales.insert(scale.key.clone(), scale);
        true
    }

    pub fn add_axis(&mut self, axis: AxisDescriptor) {
        self.axes.push(axis);
    }

    pub fn add_series(&mut self, series: SeriesDescriptor) {
        self.series.push(series);
    }

    pub fn add_band(&mut self, band: Band) {
        self.bands.push(band);
    }

    pub fn set_cursor(&mut self, cursor: CursorOptions) {
        self.cursor = cursor;
    }

    pub fn set_sync(&mut self, sync: SyncMode) {
        self.cursor.sync = sync;
    }

    pub fn add_hook(
        &mut self,
        event: HookEvent,
        hook: impl Fn(&HookPayload) + Send + Sync + 'static,
    ) {
        self.hooks.register(event, hook);
    }

    pub fn set_hooks(&mut self, hooks: &HookRegistry) {
        self.hooks = hooks.clone();
    }

    #[must_use]
    pub fn has_scale(&self, key: &str) -> bool {
        self.scales.contains_key(key)
    }

    #[must_use]
    pub fn get_config(&self) -> PlotConfig {
        PlotConfig {
            scales: self.scales.clone(),
            axes: self.axes.clone(),
            series: self.series.clone(),
            bands: self.bands.clone(),
            cursor: self.cursor,
            hooks: self.hooks.clone(),
        }
    }
}

/// Finished, read-only plot configuration.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    scales: IndexMap<String, ScaleDescriptor>,
    axes: Vec<AxisDescriptor>,
    series: Vec<SeriesDescriptor>,
    bands: Vec<Band>,
    cursor: CursorOptions,
    hooks: HookRegistry,
}

impl PlotConfig {
    #[must_use]
    pub fn scales(&self) -> &IndexMap<String, ScaleDescriptor> {
        &self.scales
    }

    #[must_use]
    pub fn scale(&self, key: &str) -> Option<&ScaleDescriptor> {
        self.scales.get(key)
    }

    #[must_use]
    pub fn axes(&self) -> &[AxisDescriptor] {
        &self.axes
    }

    #[must_use]
    pub fn series(&self) -> &[SeriesDescriptor] {
        &self.series
    }

    /// Series drawn for an aligned-frame field.
    #[must_use]
    pub fn series_for_field(&self, field_index: usize) -> Option<&SeriesDescriptor> {
        self.series
            .iter()
            .find(|series| series.field_index == field_index)
    }

    #[must_use]
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    #[must_use]
    pub fn cursor(&self) -> CursorOptions {
        self.cursor
    }

    #[must_use]
    pub fn sync(&self) -> SyncMode {
        self.cursor.sync
    }

    #[must_use]
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Forwards a renderer lifecycle event to registered hooks.
    pub fn dispatch(&self, payload: &HookPayload) -> usize {
        self.hooks.dispatch(payload)
    }

    /// `true` when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
