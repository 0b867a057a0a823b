use std::collections::BTreeMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::core::frame::{AlignedFrame, Field, FieldOrigin, FieldType, Frame, Value};
use crate::error::PlotResult;

/// Predicate selecting fields during alignment.
pub trait FieldMatcher: Send + Sync {
    fn matches(&self, field: &Field, frame: &Frame, frames: &[Frame]) -> bool;
}

impl<F> FieldMatcher for F
where
    F: Fn(&Field, &Frame, &[Frame]) -> bool + Send + Sync,
{
    fn matches(&self, field: &Field, frame: &Frame, frames: &[Frame]) -> bool {
        self(field, frame, frames)
    }
}

/// Selects the first time field of each frame.
#[must_use]
pub fn first_time_field() -> Arc<dyn FieldMatcher> {
    Arc::new(|field: &Field, frame: &Frame, _: &[Frame]| {
        frame
            .fields
            .iter()
            .find(|candidate| candidate.field_type == FieldType::Time)
            .is_some_and(|first| std::ptr::eq(first, field))
    })
}

/// Selects every number field not hidden from the visualization.
#[must_use]
pub fn visible_number_fields() -> Arc<dyn FieldMatcher> {
    Arc::new(|field: &Field, _: &Frame, _: &[Frame]| {
        field.field_type == FieldType::Number
            && !field
                .config
                .custom
                .hide_from
                .is_some_and(|hide_from| hide_from.viz)
    })
}

/// Selects fields by raw name.
#[must_use]
pub fn field_named(name: impl Into<String>) -> Arc<dyn FieldMatcher> {
    let name = name.into();
    Arc::new(move |field: &Field, _: &Frame, _: &[Frame]| field.name == name)
}

/// Index of the join field in `frame`, if any.
pub fn find_join_field(
    frame: &Frame,
    frames: &[Frame],
    x_match: &dyn FieldMatcher,
) -> Option<usize> {
    frame
        .fields
        .iter()
        .position(|field| x_match.matches(field, frame, frames))
}

/// Outer-joins `frames` on the field chosen by `x_match`.
///
/// The join column is the sorted union of every key seen. Value fields
/// chosen by `y_match` are relocated onto that index: rows a source frame
/// has no sample for become `Undefined`, explicit nulls stay `Null` unless
/// the field spans all nulls. When one frame repeats a key the last row
/// wins. Frames without a join field are skipped; if none has one the
/// result is empty.
///
/// Only structural problems are errors: every frame must be internally
/// consistent in row count.
pub fn align_frames(
    frames: &[Frame],
    x_match: &dyn FieldMatcher,
    y_match: &dyn FieldMatcher,
) -> PlotResult<AlignedFrame> {
    for (index, frame) in frames.iter().enumerate() {
        frame.validate(index)?;
    }

    let joins: Vec<(usize, usize)> = frames
        .iter()
        .enumerate()
        .filter_map(|(frame_index, frame)| {
            find_join_field(frame, frames, x_match).map(|field_index| (frame_index, field_index))
        })
        .collect();

    let Some(&(first_frame, first_field)) = joins.first() else {
        debug!(frames = frames.len(), "no join field matched; aligned frame is empty");
        return Ok(AlignedFrame::empty());
    };

    let mut rows: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    for &(frame_index, field_index) in &joins {
        for value in &frames[frame_index].fields[field_index].values {
            if let Some(key) = join_key(value) {
                rows.insert(key, 0);
            }
        }
    }
    for (row, slot) in rows.values_mut().enumerate() {
        *slot = row;
    }
    let row_count = rows.len();

    let template = &frames[first_frame].fields[first_field];
    let mut x_field = Field::new(
        template.name.clone(),
        template.field_type,
        rows.keys().map(|key| Value::Number(key.0)).collect(),
    );
    x_field.config = template.config.clone();
    x_field.origin = Some(FieldOrigin {
        frame_index: first_frame,
        field_index: first_field,
    });

    let mut fields = vec![x_field];
    let mut duplicates = 0usize;
    for &(frame_index, join_index) in &joins {
        let frame = &frames[frame_index];
        let keys = &frame.fields[join_index].values;

        for (field_index, source) in frame.fields.iter().enumerate() {
            if field_index == join_index || !y_match.matches(source, frame, frames) {
                continue;
            }

            let spans_all = source
                .config
                .custom
                .span_nulls
                .is_some_and(|span_nulls| span_nulls.spans_all());
            let mut values = vec![Value::Undefined; row_count];
            let mut written = vec![false; row_count];
            for (key, value) in keys.iter().zip(&source.values) {
                let Some(row) = join_key(key).and_then(|key| rows.get(&key).copied()) else {
                    continue;
                };
                if written[row] {
                    duplicates += 1;
                }
                written[row] = true;
                values[row] = match value {
                    Value::Null if spans_all => Value::Undefined,
                    other => other.clone(),
                };
            }

            let mut relocated = Field::new(source.name.clone(), source.field_type, values);
            relocated.config = source.config.clone();
            relocated.labels = source.labels.clone();
            relocated.origin = Some(FieldOrigin {
                frame_index,
                field_index,
            });
            trace!(
                frame_index,
                field_index,
                field = %source.name,
                "relocated field onto join index"
            );
            fields.push(relocated);
        }
    }

    if duplicates > 0 {
        debug!(duplicates, "duplicate join keys resolved last-write-wins");
    }
    debug!(
        frames = frames.len(),
        joined = joins.len(),
        rows = row_count,
        fields = fields.len(),
        "aligned frames"
    );
    Ok(AlignedFrame::from_fields(fields))
}

fn join_key(value: &Value) -> Option<OrderedFloat<f64>> {
    value
        .as_number()
        .filter(|key| !key.is_nan())
        .map(OrderedFloat)
}
