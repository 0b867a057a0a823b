use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::{
    AlignedFrame, AxisPlacement, FieldType, Orientation, ScaleDistribution, StackingMode,
    TimeRange,
};
use crate::error::{PlotError, PlotResult};

use super::series_builder::ResolvedField;
use super::value_format::{PERCENT_UNIT, ValueFormat};

pub const X_SCALE_KEY: &str = "x";
/// Scale key used for fields without a unit.
pub const FIXED_UNIT: &str = "__fixed";

/// Accessor for the currently visible time window.
///
/// Called every time a time scale's range is resolved so panning and live
/// updates are picked up without rebuilding the configuration.
pub type TimeRangeSource = Arc<dyn Fn() -> TimeRange + Send + Sync>;

#[derive(Clone)]
pub enum ScaleRange {
    /// Follows the visible time window.
    TimeWindow(TimeRangeSource),
    /// Derived from data extents and soft/hard bounds.
    Auto,
    Fixed { min: f64, max: f64 },
}

impl fmt::Debug for ScaleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeWindow(_) => f.write_str("TimeWindow(..)"),
            Self::Auto => f.write_str("Auto"),
            Self::Fixed { min, max } => write!(f, "Fixed({min}..{max})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScaleDescriptor {
    pub key: String,
    pub orientation: Orientation,
    pub is_time: bool,
    pub range: ScaleRange,
    pub distribution: ScaleDistribution,
    pub soft_min: Option<f64>,
    pub soft_max: Option<f64>,
    pub hard_min: Option<f64>,
    pub hard_max: Option<f64>,
}

impl ScaleDescriptor {
    /// Resolves the scale's range for the given data extents.
    ///
    /// Soft bounds widen the data range, hard bounds replace it. A
    /// degenerate range is padded so projection stays well defined.
    #[must_use]
    pub fn resolve_range(&self, data_min: f64, data_max: f64) -> (f64, f64) {
        match &self.range {
            ScaleRange::TimeWindow(source) => {
                let window = source();
                (window.from, window.to)
            }
            ScaleRange::Fixed { min, max } => (*min, *max),
            ScaleRange::Auto => {
                let (mut min, mut max) =
                    if data_min.is_finite() && data_max.is_finite() && data_min <= data_max {
                        (data_min, data_max)
                    } else {
                        (0.0, 1.0)
                    };
                if let Some(soft_min) = self.soft_min {
                    min = min.min(soft_min);
                }
                if let Some(soft_max) = self.soft_max {
                    max = max.max(soft_max);
                }
                if let Some(hard_min) = self.hard_min {
                    min = hard_min;
                }
                if let Some(hard_max) = self.hard_max {
                    max = hard_max;
                }
                // Two hard bounds are taken as given, even when equal.
                if max <= min && (self.hard_min.is_none() || self.hard_max.is_none()) {
                    let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
                    match (self.hard_min, self.hard_max) {
                        (None, Some(_)) => min = max - pad,
                        (Some(_), None) => max = min + pad,
                        _ => {
                            min -= pad;
                            max += pad;
                        }
                    }
                }
                (min, max)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisDescriptor {
    pub scale_key: String,
    /// Never `Auto` or `Hidden`; hidden axes are not built.
    pub placement: AxisPlacement,
    pub label: Option<String>,
    pub format: ValueFormat,
    pub is_time: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScaleAxisSet {
    pub scales: IndexMap<String, ScaleDescriptor>,
    pub axes: Vec<AxisDescriptor>,
    field_scales: IndexMap<usize, String>,
}

impl ScaleAxisSet {
    /// Scale key a value field was placed on.
    #[must_use]
    pub fn scale_key_for(&self, field_index: usize) -> Option<&str> {
        self.field_scales.get(&field_index).map(String::as_str)
    }
}

/// Derives the key under which a field shares a y scale.
///
/// Unit, distribution and the explicit axis group take part; percent
/// stacking always lands on a 0..1 percent scale.
#[must_use]
pub fn scale_key(field: &ResolvedField) -> String {
    let unit = if field.custom.stacking.mode == StackingMode::Percent {
        PERCENT_UNIT
    } else {
        field.config.unit.as_deref().unwrap_or(FIXED_UNIT)
    };
    let mut key = unit.to_owned();
    if let ScaleDistribution::Log { log } = field.custom.scale_distribution {
        key.push_str(&format!("/log{log}"));
    }
    if let Some(group) = &field.custom.axis_group {
        key.push('/');
        key.push_str(group);
    }
    key
}

#[derive(Debug, Clone, Copy, Default)]
struct Bounds {
    soft_min: Option<f64>,
    soft_max: Option<f64>,
    hard_min: Option<f64>,
    hard_max: Option<f64>,
}

fn field_bounds(field: &ResolvedField) -> PlotResult<Bounds> {
    let bounds = Bounds {
        soft_min: field.custom.axis_soft_min,
        soft_max: field.custom.axis_soft_max,
        hard_min: field.config.min,
        hard_max: field.config.max,
    };
    for (name, value) in [
        ("softMin", bounds.soft_min),
        ("softMax", bounds.soft_max),
        ("min", bounds.hard_min),
        ("max", bounds.hard_max),
    ] {
        if value.is_some_and(|value| !value.is_finite()) {
            return Err(PlotError::InvalidData(format!(
                "`{name}` of field `{}` must be finite",
                field.display_name
            )));
        }
    }
    if let (Some(min), Some(max)) = (bounds.hard_min, bounds.hard_max) {
        if min > max {
            return Err(PlotError::InvalidData(format!(
                "field `{}` has min {min} above max {max}",
                field.display_name
            )));
        }
    }
    if let (Some(min), Some(max)) = (bounds.soft_min, bounds.soft_max) {
        if min > max {
            return Err(PlotError::InvalidData(format!(
                "field `{}` has softMin {min} above softMax {max}",
                field.display_name
            )));
        }
    }
    Ok(bounds)
}

/// Folds a later field's bounds into a shared scale.
///
/// Soft bounds widen to cover every field. Hard bounds keep the first value
/// set; a later, different value is dropped with a warning, as is one that
/// would invert the range.
fn merge_bounds(scale: &mut ScaleDescriptor, bounds: Bounds, field_name: &str) {
    if let Some(soft_min) = bounds.soft_min {
        scale.soft_min = Some(scale.soft_min.map_or(soft_min, |current| current.min(soft_min)));
    }
    if let Some(soft_max) = bounds.soft_max {
        scale.soft_max = Some(scale.soft_max.map_or(soft_max, |current| current.max(soft_max)));
    }

    if let Some(hard_min) = bounds.hard_min {
        match scale.hard_min {
            None if scale.hard_max.is_some_and(|max| hard_min > max) => {
                warn!(
                    scale = %scale.key,
                    field = %field_name,
                    hard_min,
                    "hard min above shared hard max, ignored"
                );
            }
            None => scale.hard_min = Some(hard_min),
            Some(current) if current != hard_min => {
                warn!(
                    scale = %scale.key,
                    field = %field_name,
                    kept = current,
                    ignored = hard_min,
                    "conflicting hard min on shared scale"
                );
            }
            Some(_) => {}
        }
    }
    if let Some(hard_max) = bounds.hard_max {
        match scale.hard_max {
            None if scale.hard_min.is_some_and(|min| hard_max < min) => {
                warn!(
                    scale = %scale.key,
                    field = %field_name,
                    hard_max,
                    "hard max below shared hard min, ignored"
                );
            }
            None => scale.hard_max = Some(hard_max),
            Some(current) if current != hard_max => {
                warn!(
                    scale = %scale.key,
                    field = %field_name,
                    kept = current,
                    ignored = hard_max,
                    "conflicting hard max on shared scale"
                );
            }
            Some(_) => {}
        }
    }
}

/// Builds the x scale plus one y scale per distinct scale key, and one axis
/// per scale from the first field on it that does not hide its axis.
///
/// Fields sharing a scale contribute their bounds to it.
///
/// Invalid bounds on a field are logged and ignored for that field only.
#[must_use]
pub fn build_scales_and_axes(
    frame: &AlignedFrame,
    fields: &[ResolvedField],
    time_range: &TimeRangeSource,
) -> ScaleAxisSet {
    let mut set = ScaleAxisSet::default();
    let Some(x_field) = frame.x_field() else {
        return set;
    };

    let is_time = x_field.field_type == FieldType::Time;
    set.scales.insert(
        X_SCALE_KEY.to_owned(),
        ScaleDescriptor {
            key: X_SCALE_KEY.to_owned(),
            orientation: Orientation::Horizontal,
            is_time,
            range: if is_time {
                ScaleRange::TimeWindow(Arc::clone(time_range))
            } else {
                ScaleRange::Auto
            },
            distribution: ScaleDistribution::Linear,
            soft_min: None,
            soft_max: None,
            hard_min: None,
            hard_max: None,
        },
    );
    let x_placement = x_field.config.custom.axis_placement.unwrap_or_default();
    if x_placement != AxisPlacement::Hidden {
        set.axes.push(AxisDescriptor {
            scale_key: X_SCALE_KEY.to_owned(),
            placement: AxisPlacement::Bottom,
            label: x_field.config.custom.axis_label.clone(),
            format: ValueFormat::new(x_field.config.unit.clone(), x_field.config.decimals),
            is_time,
        });
    }

    let mut stack_scales: IndexMap<String, String> = IndexMap::new();
    let mut y_axis_count = 0usize;
    for field in fields {
        let stack_key = field.custom.stacking.group_key();
        let key = match stack_key
            .as_ref()
            .and_then(|group| stack_scales.get(group))
        {
            Some(shared) => shared.clone(),
            None => scale_key(field),
        };
        if let Some(group) = stack_key {
            stack_scales.entry(group).or_insert_with(|| key.clone());
        }
        set.field_scales.insert(field.field_index, key.clone());

        let bounds = field_bounds(field).unwrap_or_else(|err| {
            warn!(error = %err, field = %field.display_name, "ignoring invalid scale bounds");
            Bounds::default()
        });
        let percent = field.custom.stacking.mode == StackingMode::Percent;
        match set.scales.get_mut(&key) {
            Some(existing) => merge_bounds(existing, bounds, &field.display_name),
            None => {
                set.scales.insert(
                    key.clone(),
                    ScaleDescriptor {
                        key: key.clone(),
                        orientation: Orientation::Vertical,
                        is_time: false,
                        range: if percent {
                            ScaleRange::Fixed { min: 0.0, max: 1.0 }
                        } else {
                            ScaleRange::Auto
                        },
                        distribution: field.custom.scale_distribution,
                        soft_min: bounds.soft_min,
                        soft_max: bounds.soft_max,
                        hard_min: bounds.hard_min,
                        hard_max: bounds.hard_max,
                    },
                );
            }
        }

        if set.axes.iter().any(|axis| axis.scale_key == key) {
            continue;
        }
        let placement = match field.custom.axis_placement {
            AxisPlacement::Hidden => continue,
            AxisPlacement::Auto if y_axis_count == 0 => AxisPlacement::Left,
            AxisPlacement::Auto => AxisPlacement::Right,
            explicit => explicit,
        };
        y_axis_count += 1;
        let format = if percent {
            ValueFormat::percent_unit(field.config.decimals)
        } else {
            ValueFormat::new(field.config.unit.clone(), field.config.decimals)
        };
        set.axes.push(AxisDescriptor {
            scale_key: key,
            placement,
            label: field.custom.axis_label.clone(),
            format,
            is_time: false,
        });
    }

    debug!(
        scales = set.scales.len(),
        axes = set.axes.len(),
        "built scales and axes"
    );
    set
}
