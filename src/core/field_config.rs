//! Per-field display and rendering options.
//!
//! Every recognized option is an explicit field. Layering is done with
//! [`FieldCustomConfig::merged_over`]; [`FieldCustomConfig::resolve`] then
//! fills the remaining gaps with documented defaults.

use serde::{Deserialize, Serialize};

use crate::error::PlotResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawStyle {
    #[default]
    Line,
    Bars,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineInterpolation {
    #[default]
    Linear,
    Smooth,
    StepBefore,
    StepAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradientMode {
    #[default]
    None,
    Opacity,
    Hue,
    Scheme,
}

/// Point marker visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisibilityMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisPlacement {
    #[default]
    Auto,
    Left,
    Right,
    Top,
    Bottom,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackingMode {
    #[default]
    None,
    Normal,
    Percent,
}

impl StackingMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Normal => "normal",
            Self::Percent => "percent",
        }
    }
}

pub const DEFAULT_STACKING_GROUP: &str = "A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackingConfig {
    pub mode: StackingMode,
    pub group: String,
}

impl Default for StackingConfig {
    fn default() -> Self {
        Self {
            mode: StackingMode::None,
            group: DEFAULT_STACKING_GROUP.to_owned(),
        }
    }
}

impl StackingConfig {
    #[must_use]
    pub fn new(mode: StackingMode, group: impl Into<String>) -> Self {
        Self {
            mode,
            group: group.into(),
        }
    }

    /// Stack identity; `None` when the field is not stacked.
    #[must_use]
    pub fn group_key(&self) -> Option<String> {
        match self.mode {
            StackingMode::None => None,
            mode => Some(format!("{}:{}", mode.as_str(), self.group)),
        }
    }
}

/// Whether null runs are drawn through.
///
/// A boolean spans everything or nothing; a number is the maximum distance
/// along the join field across which a null run is still connected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpanNulls {
    Always(bool),
    Threshold(f64),
}

impl Default for SpanNulls {
    fn default() -> Self {
        Self::Always(false)
    }
}

impl SpanNulls {
    /// Numeric threshold, when one applies.
    #[must_use]
    pub fn threshold(self) -> Option<f64> {
        match self {
            Self::Threshold(value) if value.is_finite() && value > 0.0 => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn spans_all(self) -> bool {
        matches!(self, Self::Always(true))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScaleDistribution {
    #[default]
    Linear,
    Log {
        #[serde(default = "default_log_base")]
        log: f64,
    },
}

fn default_log_base() -> f64 {
    2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThresholdsStyleMode {
    #[default]
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "area")]
    Area,
    #[serde(rename = "line+area")]
    LineAndArea,
    #[serde(rename = "dashed")]
    Dashed,
    #[serde(rename = "dashed+area")]
    DashedAndArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThresholdsStyle {
    pub mode: ThresholdsStyleMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HideFrom {
    pub viz: bool,
    pub legend: bool,
    pub tooltip: bool,
}

/// One threshold step; the base step has no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdStep {
    #[serde(default)]
    pub value: Option<f64>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThresholdsConfig {
    pub steps: Vec<ThresholdStep>,
}

impl ThresholdsConfig {
    /// Color of the base (lowest) step.
    #[must_use]
    pub fn base_color(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|step| step.value.is_none())
            .or_else(|| self.steps.first())
            .map(|step| step.color.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "fixed")]
    Fixed,
    #[default]
    #[serde(rename = "palette-classic")]
    PaletteClassic,
    #[serde(rename = "thresholds")]
    Thresholds,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorConfig {
    pub mode: ColorMode,
    pub fixed_color: Option<String>,
}

/// Visualization-specific options; every entry is optional so layers can
/// be merged before defaults are applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldCustomConfig {
    pub draw_style: Option<DrawStyle>,
    pub line_interpolation: Option<LineInterpolation>,
    pub line_width: Option<f64>,
    pub fill_opacity: Option<f64>,
    pub gradient_mode: Option<GradientMode>,
    pub show_points: Option<VisibilityMode>,
    pub point_size: Option<f64>,
    pub span_nulls: Option<SpanNulls>,
    pub stacking: Option<StackingConfig>,
    pub axis_placement: Option<AxisPlacement>,
    pub axis_label: Option<String>,
    pub axis_soft_min: Option<f64>,
    pub axis_soft_max: Option<f64>,
    /// Explicit axis separation; fields with equal unit but different group
    /// get different scales.
    pub axis_group: Option<String>,
    pub scale_distribution: Option<ScaleDistribution>,
    pub thresholds_style: Option<ThresholdsStyle>,
    /// Display name of the field this one fills down to.
    pub fill_below_to: Option<String>,
    pub hide_from: Option<HideFrom>,
}

impl FieldCustomConfig {
    /// Returns `self` with unset entries taken from `base`.
    #[must_use]
    pub fn merged_over(&self, base: &Self) -> Self {
        Self {
            draw_style: self.draw_style.or(base.draw_style),
            line_interpolation: self.line_interpolation.or(base.line_interpolation),
            line_width: self.line_width.or(base.line_width),
            fill_opacity: self.fill_opacity.or(base.fill_opacity),
            gradient_mode: self.gradient_mode.or(base.gradient_mode),
            show_points: self.show_points.or(base.show_points),
            point_size: self.point_size.or(base.point_size),
            span_nulls: self.span_nulls.or(base.span_nulls),
            stacking: self.stacking.clone().or_else(|| base.stacking.clone()),
            axis_placement: self.axis_placement.or(base.axis_placement),
            axis_label: self.axis_label.clone().or_else(|| base.axis_label.clone()),
            axis_soft_min: self.axis_soft_min.or(base.axis_soft_min),
            axis_soft_max: self.axis_soft_max.or(base.axis_soft_max),
            axis_group: self.axis_group.clone().or_else(|| base.axis_group.clone()),
            scale_distribution: self.scale_distribution.or(base.scale_distribution),
            thresholds_style: self.thresholds_style.or(base.thresholds_style),
            fill_below_to: self
                .fill_below_to
                .clone()
                .or_else(|| base.fill_below_to.clone()),
            hide_from: self.hide_from.or(base.hide_from),
        }
    }

    #[must_use]
    pub fn resolve(&self) -> ResolvedCustomConfig {
        ResolvedCustomConfig {
            draw_style: self.draw_style.unwrap_or_default(),
            line_interpolation: self.line_interpolation.unwrap_or_default(),
            line_width: self.line_width.unwrap_or(DEFAULT_LINE_WIDTH),
            fill_opacity: self.fill_opacity,
            gradient_mode: self.gradient_mode.unwrap_or_default(),
            show_points: self.show_points.unwrap_or_default(),
            point_size: self.point_size.unwrap_or(DEFAULT_POINT_SIZE),
            span_nulls: self.span_nulls.unwrap_or_default(),
            stacking: self.stacking.clone().unwrap_or_default(),
            axis_placement: self.axis_placement.unwrap_or_default(),
            axis_label: self.axis_label.clone(),
            axis_soft_min: self.axis_soft_min,
            axis_soft_max: self.axis_soft_max,
            axis_group: self.axis_group.clone(),
            scale_distribution: self.scale_distribution.unwrap_or_default(),
            thresholds_style: self.thresholds_style.unwrap_or_default().mode,
            fill_below_to: self.fill_below_to.clone(),
            hide_from: self.hide_from.unwrap_or_default(),
        }
    }
}

pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_POINT_SIZE: f64 = 5.0;

/// Custom config after layering, with defaults applied.
///
/// `fill_opacity` stays optional because a "fill below to" target changes
/// its default.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCustomConfig {
    pub draw_style: DrawStyle,
    pub line_interpolation: LineInterpolation,
    pub line_width: f64,
    pub fill_opacity: Option<f64>,
    pub gradient_mode: GradientMode,
    pub show_points: VisibilityMode,
    pub point_size: f64,
    pub span_nulls: SpanNulls,
    pub stacking: StackingConfig,
    pub axis_placement: AxisPlacement,
    pub axis_label: Option<String>,
    pub axis_soft_min: Option<f64>,
    pub axis_soft_max: Option<f64>,
    pub axis_group: Option<String>,
    pub scale_distribution: ScaleDistribution,
    pub thresholds_style: ThresholdsStyleMode,
    pub fill_below_to: Option<String>,
    pub hide_from: HideFrom,
}

/// Field-level options shared by every visualization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfig {
    pub display_name: Option<String>,
    pub unit: Option<String>,
    pub decimals: Option<u8>,
    /// Hard lower bound for the field's scale.
    pub min: Option<f64>,
    /// Hard upper bound for the field's scale.
    pub max: Option<f64>,
    pub color: Option<ColorConfig>,
    pub thresholds: Option<ThresholdsConfig>,
    pub custom: FieldCustomConfig,
}

impl FieldConfig {
    pub fn from_json_str(json: &str) -> PlotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
