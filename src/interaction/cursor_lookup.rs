use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::core::Value;

/// Row whose key is closest to `x`; ties go to the lower row.
#[must_use]
pub fn closest_index(x_values: &[f64], x: f64) -> Option<usize> {
    if x_values.is_empty() || !x.is_finite() {
        return None;
    }
    let upper = x_values.partition_point(|value| *value < x);
    if upper == 0 {
        return Some(0);
    }
    if upper == x_values.len() {
        return Some(x_values.len() - 1);
    }
    let lower = upper - 1;
    if x - x_values[lower] <= x_values[upper] - x {
        Some(lower)
    } else {
        Some(upper)
    }
}

/// Snaps a hover on a null cell to the nearest non-null neighbor.
///
/// Scans left and right independently, projects both candidates to pixels
/// with `to_pixel`, and takes the nearer one if it lies within
/// `proximity_px` of `cursor_px`. Equal distances prefer the left
/// candidate. Otherwise `hovered` is returned unchanged.
pub fn nearest_non_null_index(
    values: &[Value],
    x_values: &[f64],
    hovered: usize,
    cursor_px: f64,
    proximity_px: f64,
    to_pixel: impl Fn(f64) -> Option<f64>,
) -> usize {
    match values.get(hovered) {
        Some(value) if !value.is_missing() => return hovered,
        None => return hovered,
        Some(_) => {}
    }

    let left = (0..hovered).rev().find(|&index| !values[index].is_missing());
    let right = (hovered + 1..values.len()).find(|&index| !values[index].is_missing());

    // Left is pushed first so an equal distance resolves to it.
    let mut candidates: SmallVec<[(OrderedFloat<f64>, usize); 2]> = SmallVec::new();
    for index in [left, right].into_iter().flatten() {
        let Some(pixel) = x_values.get(index).and_then(|&x| to_pixel(x)) else {
            continue;
        };
        candidates.push((OrderedFloat((pixel - cursor_px).abs()), index));
    }

    match candidates.into_iter().min_by_key(|candidate| candidate.0) {
        Some((distance, index)) if distance.0 <= proximity_px => index,
        _ => hovered,
    }
}
