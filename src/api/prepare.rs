use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::{
    AlignedFrame, FieldCustomConfig, FieldMatcher, Frame, LinearScale, Orientation, TimeRange,
    Viewport, align_frames, apply_span_nulls_thresholds, find_join_field, first_time_field,
    visible_number_fields,
};
use crate::error::{PlotError, PlotResult};
use crate::extensions::{HookEvent, HookPayload, HookRegistry};
use crate::interaction::{CursorOptions, HoverTarget, SyncMode};
use crate::render::Theme;

use super::config_builder::{PlotConfig, PlotConfigBuilder};
use super::scale_axis_builder::{
    ScaleDescriptor, TimeRangeSource, X_SCALE_KEY, build_scales_and_axes,
};
use super::series_builder::{CustomRenderer, build_series, resolve_value_fields};
use super::stacking::{
    StackGroup, StackOrder, StackedValues, stack_groups, stack_values, stacking_bands,
};

/// Declared inputs for one configuration build.
#[derive(Clone)]
pub struct PlotOptions {
    pub x_match: Arc<dyn FieldMatcher>,
    pub y_match: Arc<dyn FieldMatcher>,
    pub time_range: TimeRangeSource,
    pub theme: Theme,
    /// Visualization-family defaults, the lowest config layer.
    pub defaults: FieldCustomConfig,
    pub custom_renderers: Vec<CustomRenderer>,
    pub stack_order: StackOrder,
    pub cursor: CursorOptions,
    pub hooks: HookRegistry,
}

impl fmt::Debug for PlotOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotOptions")
            .field("theme", &self.theme)
            .field("defaults", &self.defaults)
            .field("custom_renderers", &self.custom_renderers)
            .field("stack_order", &self.stack_order)
            .field("cursor", &self.cursor)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl PlotOptions {
    /// Options joining on the first time field and plotting every visible
    /// number field.
    pub fn new(time_range: impl Fn() -> TimeRange + Send + Sync + 'static) -> Self {
        Self {
            x_match: first_time_field(),
            y_match: visible_number_fields(),
            time_range: Arc::new(time_range),
            theme: Theme::default(),
            defaults: FieldCustomConfig::default(),
            custom_renderers: Vec::new(),
            stack_order: StackOrder::default(),
            cursor: CursorOptions::default(),
            hooks: HookRegistry::default(),
        }
    }

    #[must_use]
    pub fn with_matchers(
        mut self,
        x_match: Arc<dyn FieldMatcher>,
        y_match: Arc<dyn FieldMatcher>,
    ) -> Self {
        self.x_match = x_match;
        self.y_match = y_match;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: FieldCustomConfig) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn with_custom_renderer(mut self, renderer: CustomRenderer) -> Self {
        self.custom_renderers.push(renderer);
        self
    }

    #[must_use]
    pub fn with_stack_order(mut self, order: StackOrder) -> Self {
        self.stack_order = order;
        self
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: CursorOptions) -> Self {
        self.cursor = cursor;
        self
    }

    #[must_use]
    pub fn with_sync(mut self, sync: SyncMode) -> Self {
        self.cursor.sync = sync;
        self
    }

    #[must_use]
    pub fn with_hook(
        mut self,
        event: HookEvent,
        hook: impl Fn(&HookPayload) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.register(event, hook);
        self
    }
}

/// Aligned data plus the configuration built from it.
#[derive(Debug, Clone)]
pub struct PreparedPlot {
    pub frame: Arc<AlignedFrame>,
    pub config: PlotConfig,
    pub stack_groups: Vec<StackGroup>,
    pub stacked: Vec<StackedValues>,
}

impl PreparedPlot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Stacked values of one field, when it belongs to a stacking group.
    #[must_use]
    pub fn stacked_values(&self, field_index: usize) -> Option<&[Option<f64>]> {
        self.stacked
            .iter()
            .find(|stacked| stacked.field_index == field_index)
            .map(|stacked| stacked.values.as_slice())
    }

    fn x_scale_parts(&self) -> PlotResult<(ScaleDescriptor, f64, f64)> {
        let scale = self
            .config
            .scale(X_SCALE_KEY)
            .ok_or_else(|| PlotError::InvalidData("plot has no x scale".to_owned()))?;
        let x_values = self.frame.x_values();
        let data_min = x_values.first().copied().unwrap_or(f64::NAN);
        let data_max = x_values.last().copied().unwrap_or(f64::NAN);
        Ok((scale.clone(), data_min, data_max))
    }

    /// Projection for the x scale as currently resolved.
    pub fn x_scale(&self) -> PlotResult<LinearScale> {
        let (scale, data_min, data_max) = self.x_scale_parts()?;
        let (min, max) = scale.resolve_range(data_min, data_max);
        LinearScale::new(min, max, Orientation::Horizontal)
    }

    /// Hover target for a cursor coordinator drawing into `viewport`.
    ///
    /// The target re-resolves the x scale on every projection, so it keeps
    /// following the visible time window.
    pub fn hover_target(&self, viewport: Viewport) -> PlotResult<HoverTarget> {
        self.x_scale()?;
        let (scale, data_min, data_max) = self.x_scale_parts()?;
        Ok(HoverTarget::with_x_domain(
            Arc::clone(&self.frame),
            Arc::new(move || scale.resolve_range(data_min, data_max)),
            viewport,
        ))
    }
}

/// Turns raw frames into one aligned frame and its plot configuration.
///
/// Frames are thresholded for span-nulls in place, outer-joined, and then
/// run through the scale, series and stacking builders. Every call starts
/// from `frames` and `options` alone. An unmatched join field yields an
/// empty but valid configuration; a frame with inconsistent field lengths
/// is an error.
pub fn prepare_plot(mut frames: Vec<Frame>, options: &PlotOptions) -> PlotResult<PreparedPlot> {
    for (frame_index, frame) in frames.iter().enumerate() {
        frame.validate(frame_index)?;
    }

    let join_fields: Vec<Option<usize>> = frames
        .iter()
        .map(|frame| find_join_field(frame, &frames, options.x_match.as_ref()))
        .collect();
    let mut thresholded = 0usize;
    for (frame, join_field) in frames.iter_mut().zip(join_fields) {
        if let Some(ref_index) = join_field {
            thresholded += apply_span_nulls_thresholds(frame, ref_index);
        }
    }

    let aligned = align_frames(&frames, options.x_match.as_ref(), options.y_match.as_ref())?;

    let mut builder = PlotConfigBuilder::new();
    builder.set_cursor(options.cursor);
    builder.set_hooks(&options.hooks);

    if aligned.is_empty() {
        debug!(frames = frames.len(), "nothing to plot");
        return Ok(PreparedPlot {
            frame: Arc::new(aligned),
            config: builder.get_config(),
            stack_groups: Vec::new(),
            stacked: Vec::new(),
        });
    }

    let fields = resolve_value_fields(
        &aligned,
        &frames,
        &options.defaults,
        &options.custom_renderers,
    );
    let scales = build_scales_and_axes(&aligned, &fields, &options.time_range);
    let series = build_series(&aligned, &fields, &scales, &options.theme);
    let groups = stack_groups(
        fields
            .iter()
            .map(|field| (field.field_index, &field.custom.stacking)),
        &aligned,
        &options.stack_order,
    );
    let stacked = stack_values(&aligned, &groups);

    for scale in scales.scales.into_values() {
        builder.add_scale(scale);
    }
    for axis in scales.axes {
        builder.add_axis(axis);
    }
    for descriptor in series.series {
        builder.add_series(descriptor);
    }
    for band in series.bands.into_iter().chain(stacking_bands(&groups)) {
        builder.add_band(band);
    }

    let config = builder.get_config();
    debug!(
        frames = frames.len(),
        rows = aligned.row_count(),
        series = config.series().len(),
        bands = config.bands().len(),
        thresholded,
        "prepared plot"
    );

    Ok(PreparedPlot {
        frame: Arc::new(aligned),
        config,
        stack_groups: groups,
        stacked,
    })
}
