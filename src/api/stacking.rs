use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::trace;

use crate::core::{AlignedFrame, Field, StackingConfig, StackingMode, Value};
use crate::render::Color;

/// Fill region between two series, by aligned-frame field index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub series_a: usize,
    pub series_b: usize,
    /// `None` lets the renderer reuse the upper series' fill.
    pub fill: Option<Color>,
}

impl Band {
    #[must_use]
    pub fn new(series_a: usize, series_b: usize) -> Self {
        Self {
            series_a,
            series_b,
            fill: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Last,
    Min,
    Max,
    Mean,
}

impl Reducer {
    /// Reduces the numeric cells of `values`; `None` when there are none.
    #[must_use]
    pub fn reduce(self, values: &[Value]) -> Option<f64> {
        let numbers = values
            .iter()
            .filter_map(Value::as_number)
            .filter(|value| !value.is_nan());
        match self {
            Self::Last => numbers.last(),
            Self::Min => numbers.map(OrderedFloat).min().map(|value| value.0),
            Self::Max => numbers.map(OrderedFloat).max().map(|value| value.0),
            Self::Mean => {
                let (sum, count) = numbers.fold((0.0, 0usize), |(sum, count), value| {
                    (sum + value, count + 1)
                });
                (count > 0).then(|| sum / count as f64)
            }
        }
    }
}

pub type StackOrderFn = Arc<dyn Fn(&Field) -> Option<f64> + Send + Sync>;

/// Ordering of members inside a stacking group, bottom first.
#[derive(Clone, Default)]
pub enum StackOrder {
    #[default]
    FieldOrder,
    /// Ascending by a reduced value of each member.
    Reduce(Reducer),
    /// Ascending by a caller-computed key.
    Custom(StackOrderFn),
}

impl fmt::Debug for StackOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldOrder => f.write_str("FieldOrder"),
            Self::Reduce(reducer) => write!(f, "Reduce({reducer:?})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl StackOrder {
    fn key(&self, field: Option<&Field>) -> Option<f64> {
        let field = field?;
        match self {
            Self::FieldOrder => None,
            Self::Reduce(reducer) => reducer.reduce(&field.values),
            Self::Custom(order) => order(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackGroup {
    pub key: String,
    pub mode: StackingMode,
    /// Field indices, bottom of the stack first.
    pub members: Vec<usize>,
}

/// Groups stacked fields and orders each group.
///
/// Unstacked fields are ignored. Ties and missing order keys keep the
/// original field order; members without a key sort after those with one.
pub fn stack_groups<'a>(
    members: impl IntoIterator<Item = (usize, &'a StackingConfig)>,
    frame: &AlignedFrame,
    order: &StackOrder,
) -> Vec<StackGroup> {
    let mut grouped: IndexMap<String, (StackingMode, Vec<usize>)> = IndexMap::new();
    for (field_index, stacking) in members {
        let Some(key) = stacking.group_key() else {
            continue;
        };
        grouped
            .entry(key)
            .or_insert_with(|| (stacking.mode, Vec::new()))
            .1
            .push(field_index);
    }

    grouped
        .into_iter()
        .map(|(key, (mode, members))| {
            let mut keyed: Vec<(Option<OrderedFloat<f64>>, usize)> = members
                .into_iter()
                .map(|index| (order.key(frame.field(index)).map(OrderedFloat), index))
                .collect();
            keyed.sort_by(|a, b| match (a.0, b.0) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
            StackGroup {
                key,
                mode,
                members: keyed.into_iter().map(|(_, index)| index).collect(),
            }
        })
        .collect()
}

/// Emits `n - 1` bands per group of `n`, pairing each member with the one
/// directly below it, from the top of the stack down.
#[must_use]
pub fn stacking_bands(groups: &[StackGroup]) -> Vec<Band> {
    let mut bands = Vec::new();
    for group in groups {
        for position in (1..group.members.len()).rev() {
            bands.push(Band::new(
                group.members[position],
                group.members[position - 1],
            ));
        }
        trace!(group = %group.key, members = group.members.len(), "stacking bands");
    }
    bands
}

/// Draw-ready values for one stacked field.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedValues {
    pub field_index: usize,
    pub values: Vec<Option<f64>>,
}

/// Accumulates each group bottom-up.
///
/// Missing cells stay `None` and add nothing to the running sum. Percent
/// groups divide by the row's group total (a zero total yields 0).
#[must_use]
pub fn stack_values(frame: &AlignedFrame, groups: &[StackGroup]) -> Vec<StackedValues> {
    let rows = frame.row_count();
    let mut stacked = Vec::new();

    for group in groups {
        let totals: Vec<f64> = if group.mode == StackingMode::Percent {
            (0..rows)
                .map(|row| {
                    group
                        .members
                        .iter()
                        .filter_map(|&index| cell(frame, index, row))
                        .sum()
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut running = vec![0.0; rows];
        for &index in &group.members {
            let values = (0..rows)
                .map(|row| {
                    let value = cell(frame, index, row)?;
                    running[row] += value;
                    Some(match totals.get(row) {
                        Some(&total) if total != 0.0 => running[row] / total,
                        Some(_) => 0.0,
                        None => running[row],
                    })
                })
                .collect();
            stacked.push(StackedValues {
                field_index: index,
                values,
            });
        }
    }
    stacked
}

fn cell(frame: &AlignedFrame, field_index: usize, row: usize) -> Option<f64> {
    frame
        .field(field_index)?
        .values
        .get(row)?
        .as_number()
        .filter(|value| value.is_finite())
}
