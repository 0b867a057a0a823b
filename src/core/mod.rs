pub mod field_config;
pub mod frame;
pub mod gaps;
pub mod join;
pub mod scale;
pub mod types;

pub use field_config::{
    AxisPlacement, ColorConfig, ColorMode, DrawStyle, FieldConfig, FieldCustomConfig,
    GradientMode, HideFrom, LineInterpolation, ResolvedCustomConfig, ScaleDistribution,
    SpanNulls, StackingConfig, StackingMode, ThresholdStep, ThresholdsConfig, ThresholdsStyle,
    ThresholdsStyleMode, VisibilityMode,
};
pub use frame::{
    AlignedFrame, Field, FieldOrigin, FieldType, Frame, FrameMeta, Value, field_display_name,
};
pub use gaps::{Gap, apply_null_threshold, apply_span_nulls_thresholds, find_gaps};
pub use join::{
    FieldMatcher, align_frames, field_named, find_join_field, first_time_field,
    visible_number_fields,
};
pub use scale::{LinearScale, Orientation};
pub use types::{TimeRange, Viewport};
