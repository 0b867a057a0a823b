use tracing::trace;

use crate::core::frame::{FieldType, Frame, Value};

/// Rewrites interior null runs into `Undefined` when the samples bounding
/// the run are closer than `threshold` along `ref_values`.
///
/// Leading and trailing runs have only one bound and are left alone. Both
/// null flavors count as missing, so running this twice with the same
/// threshold changes nothing the second time. A run whose closing bound
/// lies before its opening bound (unsorted input) is never spanned. Returns
/// the number of cells rewritten.
pub fn apply_null_threshold(ref_values: &[Value], values: &mut [Value], threshold: f64) -> usize {
    let mut prev_ref: Option<f64> = None;
    let mut run_start: Option<usize> = None;
    let mut rewritten = 0;

    for index in 0..values.len() {
        let current_ref = ref_values.get(index).and_then(Value::as_number);
        let missing = values[index].is_missing();

        match (missing, current_ref) {
            (true, _) | (false, None) => {
                if run_start.is_none() && prev_ref.is_some() {
                    run_start = Some(index);
                }
            }
            (false, Some(current)) => {
                if let (Some(start), Some(prev)) = (run_start, prev_ref) {
                    if (0.0..threshold).contains(&(current - prev)) {
                        for cell in &mut values[start..index] {
                            if cell.is_null() {
                                *cell = Value::Undefined;
                                rewritten += 1;
                            }
                        }
                    }
                }
                run_start = None;
                prev_ref = Some(current);
            }
        }
    }

    rewritten
}

/// Applies each numeric field's span-nulls threshold against the frame's
/// reference field, in place.
///
/// Fields configured with a boolean span-nulls value are untouched.
pub fn apply_span_nulls_thresholds(frame: &mut Frame, ref_index: usize) -> usize {
    let Some(ref_field) = frame.fields.get(ref_index) else {
        return 0;
    };
    let ref_values = ref_field.values.clone();

    let mut total = 0;
    for (index, field) in frame.fields.iter_mut().enumerate() {
        if index == ref_index || field.field_type != FieldType::Number {
            continue;
        }
        let Some(threshold) = field
            .config
            .custom
            .span_nulls
            .and_then(|span_nulls| span_nulls.threshold())
        else {
            continue;
        };
        let rewritten = apply_null_threshold(&ref_values, &mut field.values, threshold);
        if rewritten > 0 {
            trace!(field = %field.name, threshold, rewritten, "null runs spanned");
        }
        total += rewritten;
    }
    total
}

/// A run of explicit nulls described by the valid samples around it.
///
/// `start` is `None` for a run at the beginning of the series and `end` is
/// `None` for a run at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// Finds the gaps a line renderer will break on.
///
/// `Undefined` cells are drawn through and therefore skipped. The series
/// edges are reported as gaps too (open-ended) whenever the series has at
/// least one null run, so a lone first or last sample can be detected the
/// same way as a lone interior one.
#[must_use]
pub fn find_gaps(values: &[Value]) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut last_valid: Option<usize> = None;
    let mut in_run = false;
    let mut saw_null = false;

    for (index, value) in values.iter().enumerate() {
        match value {
            Value::Undefined => {}
            Value::Null => {
                saw_null = true;
                in_run = true;
            }
            _ => {
                if in_run || last_valid.is_none() {
                    gaps.push(Gap {
                        start: last_valid,
                        end: Some(index),
                    });
                }
                in_run = false;
                last_valid = Some(index);
            }
        }
    }

    if !saw_null {
        return Vec::new();
    }
    if last_valid.is_some() {
        gaps.push(Gap {
            start: last_valid,
            end: None,
        });
    }
    gaps
}
