//! Per-field series parameters.
//!
//! Configuration is layered explicitly: visualization-family defaults,
//! then the field's own custom config, then a declared custom renderer's
//! overrides. Custom renderers and "fill below to" targets are matched by
//! display name resolved through the field origin, since several frames can
//! carry fields with the same raw name.

use tracing::{debug, warn};

use crate::core::{
    AlignedFrame, DrawStyle, FieldConfig, FieldCustomConfig, Frame, GradientMode, HideFrom,
    LineInterpolation, ResolvedCustomConfig, StackingConfig, StackingMode, ThresholdsConfig,
    ThresholdsStyleMode, Value, VisibilityMode, find_gaps,
};
use crate::render::{Color, Theme};

use super::scale_axis_builder::{FIXED_UNIT, ScaleAxisSet};
use super::stacking::Band;
use super::value_format::ValueFormat;

/// Fill opacity applied to a "fill below to" series that sets none.
pub const DEFAULT_FILL_BELOW_OPACITY: f64 = 35.0;

/// Replaces the default path and point builders for one field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomRenderer {
    /// Display name of the field to substitute.
    pub display_name: String,
    /// Renderer identifier handed to the rendering library.
    pub renderer: String,
    /// Highest-precedence config layer for the field.
    pub overrides: FieldCustomConfig,
}

impl CustomRenderer {
    #[must_use]
    pub fn new(display_name: impl Into<String>, renderer: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            renderer: renderer.into(),
            overrides: FieldCustomConfig::default(),
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: FieldCustomConfig) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Value field after display-name resolution and config layering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub field_index: usize,
    pub display_name: String,
    pub config: FieldConfig,
    pub custom: ResolvedCustomConfig,
    pub custom_renderer: Option<String>,
}

/// Resolves every value field of `frame`.
///
/// Custom renderers whose display name matches no field are logged and
/// otherwise ignored.
#[must_use]
pub fn resolve_value_fields(
    frame: &AlignedFrame,
    frames: &[Frame],
    defaults: &FieldCustomConfig,
    custom_renderers: &[CustomRenderer],
) -> Vec<ResolvedField> {
    let mut matched = vec![false; custom_renderers.len()];
    let resolved: Vec<ResolvedField> = frame
        .value_fields()
        .map(|(field_index, field)| {
            let display_name = frame
                .display_name(field_index, frames)
                .unwrap_or_else(|| field.name.clone());
            let mut custom = field.config.custom.merged_over(defaults);
            let mut custom_renderer = None;
            if let Some(position) = custom_renderers
                .iter()
                .position(|renderer| renderer.display_name == display_name)
            {
                matched[position] = true;
                let renderer = &custom_renderers[position];
                custom = renderer.overrides.merged_over(&custom);
                custom_renderer = Some(renderer.renderer.clone());
            }
            ResolvedField {
                field_index,
                display_name,
                config: field.config.clone(),
                custom: custom.resolve(),
                custom_renderer,
            }
        })
        .collect();

    for (renderer, found) in custom_renderers.iter().zip(matched) {
        if !found {
            warn!(
                display_name = %renderer.display_name,
                renderer = %renderer.renderer,
                "custom renderer matches no field; using default rendering"
            );
        }
    }
    resolved
}

/// Path or point construction strategy handed to the rendering library.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PathBuilder {
    #[default]
    Default,
    /// Default builder disabled; the named custom renderer draws instead.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDescriptor {
    /// Index of the field in the aligned frame.
    pub field_index: usize,
    pub display_name: String,
    pub scale_key: String,
    pub draw_style: DrawStyle,
    pub line_interpolation: LineInterpolation,
    pub line_width: f64,
    pub line_color: Color,
    pub fill_opacity: f64,
    pub fill_color: Option<Color>,
    pub gradient_mode: GradientMode,
    pub show_points: VisibilityMode,
    pub point_size: f64,
    pub span_gaps: bool,
    pub stacking: StackingConfig,
    pub value_format: ValueFormat,
    /// Row indices that need a point marker because they are isolated
    /// between gaps. `None` when no filtering applies.
    pub points_filter: Option<Vec<usize>>,
    pub path_builder: PathBuilder,
    pub points_builder: PathBuilder,
    pub thresholds_style: ThresholdsStyleMode,
    pub thresholds: Option<ThresholdsConfig>,
    pub hide_from: HideFrom,
}

/// Series plus the bands requested by "fill below to" targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    pub series: Vec<SeriesDescriptor>,
    pub bands: Vec<Band>,
}

/// Rows holding a sample with a gap on both sides.
///
/// Two gaps touch when one ends on the sample the next starts from; that
/// sample would otherwise draw nothing.
#[must_use]
pub fn isolated_point_indices(values: &[Value]) -> Option<Vec<usize>> {
    let gaps = find_gaps(values);
    let points: Vec<usize> = gaps
        .windows(2)
        .filter_map(|pair| match (pair[0].end, pair[1].start) {
            (Some(end), Some(start)) if end == start => Some(end),
            _ => None,
        })
        .collect();
    (!points.is_empty()).then_some(points)
}

/// Builds one series per resolved field.
///
/// Percent-stacked fields format as percent regardless of unit. A "fill
/// below to" target that cannot be resolved is logged and the field keeps
/// its standard fill.
#[must_use]
pub fn build_series(
    frame: &AlignedFrame,
    fields: &[ResolvedField],
    scales: &ScaleAxisSet,
    theme: &Theme,
) -> SeriesSet {
    let mut set = SeriesSet::default();

    for (series_index, field) in fields.iter().enumerate() {
        let custom = &field.custom;
        let line_color = theme.series_color(
            field.config.color.as_ref(),
            field.config.thresholds.as_ref(),
            series_index,
        );

        let value_format = if custom.stacking.mode == StackingMode::Percent {
            ValueFormat::percent_unit(field.config.decimals)
        } else {
            ValueFormat::new(field.config.unit.clone(), field.config.decimals)
        };

        let mut fill_opacity = custom.fill_opacity;
        if let Some(target_name) = &custom.fill_below_to {
            match fields
                .iter()
                .find(|candidate| &candidate.display_name == target_name)
            {
                Some(target) if target.field_index != field.field_index => {
                    let opacity = *fill_opacity.get_or_insert(DEFAULT_FILL_BELOW_OPACITY);
                    set.bands.push(Band {
                        series_a: field.field_index,
                        series_b: target.field_index,
                        fill: Some(line_color.with_alpha(opacity / 100.0)),
                    });
                }
                _ => warn!(
                    field = %field.display_name,
                    target = %target_name,
                    "fill below target not found; using standard fill"
                ),
            }
        }
        let fill_opacity = fill_opacity.unwrap_or(0.0);
        let fill_color =
            (fill_opacity > 0.0).then(|| line_color.with_alpha(fill_opacity / 100.0));

        let span_gaps = custom.span_nulls.spans_all();
        let points_filter = if span_gaps || custom.show_points == VisibilityMode::Always {
            None
        } else {
            frame
                .field(field.field_index)
                .and_then(|source| isolated_point_indices(&source.values))
        };

        let (path_builder, points_builder) = match &field.custom_renderer {
            Some(renderer) => (
                PathBuilder::Custom(renderer.clone()),
                PathBuilder::Custom(renderer.clone()),
            ),
            None => (PathBuilder::Default, PathBuilder::Default),
        };

        set.series.push(SeriesDescriptor {
            field_index: field.field_index,
            display_name: field.display_name.clone(),
            scale_key: scales
                .scale_key_for(field.field_index)
                .unwrap_or(FIXED_UNIT)
                .to_owned(),
            draw_style: custom.draw_style,
            line_interpolation: custom.line_interpolation,
            line_width: custom.line_width,
            line_color,
            fill_opacity,
            fill_color,
            gradient_mode: custom.gradient_mode,
            show_points: custom.show_points,
            point_size: custom.point_size,
            span_gaps,
            stacking: custom.stacking.clone(),
            value_format,
            points_filter,
            path_builder,
            points_builder,
            thresholds_style: custom.thresholds_style,
            thresholds: field.config.thresholds.clone(),
            hide_from: custom.hide_from,
        });
    }

    debug!(
        series = set.series.len(),
        bands = set.bands.len(),
        "built series"
    );
    set
}
