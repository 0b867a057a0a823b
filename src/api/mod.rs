//! Configuration pipeline from raw frames to a renderer-ready plot config.

pub mod config_builder;
pub mod prepare;
pub mod scale_axis_builder;
pub mod series_builder;
pub mod stacking;
pub mod value_format;

pub use config_builder::{PlotConfig, PlotConfigBuilder};
pub use prepare::{PlotOptions, PreparedPlot, prepare_plot};
pub use scale_axis_builder::{
    AxisDescriptor, FIXED_UNIT, ScaleAxisSet, ScaleDescriptor, ScaleRange, TimeRangeSource,
    X_SCALE_KEY, build_scales_and_axes, scale_key,
};
pub use series_builder::{
    CustomRenderer, DEFAULT_FILL_BELOW_OPACITY, PathBuilder, ResolvedField, SeriesDescriptor,
    SeriesSet, build_series, isolated_point_indices, resolve_value_fields,
};
pub use stacking::{
    Band, Reducer, StackGroup, StackOrder, StackOrderFn, StackedValues, stack_groups,
    stack_values, stacking_bands,
};
pub use value_format::{FormattedValue, PERCENT_UNIT, ValueFormat};
