use std::collections::BTreeMap;

use crate::core::field_config::FieldConfig;
use crate::error::{PlotError, PlotResult};

/// One cell of a field.
///
/// `Null` is an explicit gap (the line breaks); `Undefined` means there is
/// no sample and the line is drawn through.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `true` for both null flavors.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Time,
    Number,
    String,
    Other,
}

/// Position of a field in the caller's input frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldOrigin {
    pub frame_index: usize,
    pub field_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub values: Vec<Value>,
    pub config: FieldConfig,
    pub labels: BTreeMap<String, String>,
    pub origin: Option<FieldOrigin>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            field_type,
            values,
            config: FieldConfig::default(),
            labels: BTreeMap::new(),
            origin: None,
        }
    }

    /// Time field from epoch milliseconds.
    #[must_use]
    pub fn time(name: impl Into<String>, millis: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            FieldType::Time,
            millis.into_iter().map(Value::Number).collect(),
        )
    }

    #[must_use]
    pub fn number(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(
            name,
            FieldType::Number,
            values.into_iter().map(Value::from).collect(),
        )
    }

    #[must_use]
    pub fn string(name: impl Into<String>, values: impl IntoIterator<Item = &'static str>) -> Self {
        Self::new(
            name,
            FieldType::String,
            values.into_iter().map(Value::from).collect(),
        )
    }

    #[must_use]
    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Name decorated with labels, e.g. `cpu{host="a"}`.
    #[must_use]
    pub fn labeled_name(&self) -> String {
        if self.labels.is_empty() {
            return self.name.clone();
        }
        let labels: Vec<String> = self
            .labels
            .iter()
            .map(|(key, value)| format!("{key}=\"{value}\""))
            .collect();
        format!("{}{{{}}}", self.name, labels.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameMeta {
    pub preferred_visualisation: Option<String>,
    pub stats: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub name: Option<String>,
    pub ref_id: Option<String>,
    pub fields: Vec<Field>,
    pub meta: FrameMeta,
}

impl Frame {
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, Field::len)
    }

    /// Rejects frames whose fields disagree on row count.
    pub fn validate(&self, frame_index: usize) -> PlotResult<()> {
        let expected = self.row_count();
        for field in &self.fields {
            if field.len() != expected {
                return Err(PlotError::FieldLengthMismatch {
                    frame: frame_index,
                    field: field.name.clone(),
                    expected,
                    actual: field.len(),
                });
            }
        }
        Ok(())
    }
}

/// Resolves the name a field is shown under.
///
/// Configured display name first, then the label-decorated name. When
/// another frame carries a field with the same name, the frame name (or
/// query ref id) is prefixed so the two stay distinguishable.
#[must_use]
pub fn field_display_name(frames: &[Frame], origin: FieldOrigin) -> Option<String> {
    let frame = frames.get(origin.frame_index)?;
    let field = frame.fields.get(origin.field_index)?;
    if let Some(name) = &field.config.display_name {
        return Some(name.clone());
    }

    let base = field.labeled_name();
    let shared = frames.iter().enumerate().any(|(index, other)| {
        index != origin.frame_index
            && other
                .fields
                .iter()
                .any(|candidate| candidate.labeled_name() == base)
    });
    if shared {
        if let Some(prefix) = frame.name.as_ref().or(frame.ref_id.as_ref()) {
            return Some(format!("{prefix} {base}"));
        }
    }
    Some(base)
}

/// Frame produced by joining input frames on one key.
///
/// Field 0 is the join key (strictly ascending, unique); every other field
/// carries the origin it was relocated from. A frame with zero fields means
/// there is nothing to render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedFrame {
    fields: Vec<Field>,
}

impl AlignedFrame {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    #[must_use]
    pub fn x_field(&self) -> Option<&Field> {
        self.fields.first()
    }

    /// Join-key values; empty for an empty frame.
    #[must_use]
    pub fn x_values(&self) -> Vec<f64> {
        self.x_field()
            .map(|field| field.values.iter().filter_map(Value::as_number).collect())
            .unwrap_or_default()
    }

    /// Value fields with their index in [`Self::fields`].
    pub fn value_fields(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.fields.iter().enumerate().skip(1)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.x_field().map_or(0, Field::len)
    }

    /// Display name traced through the field's origin.
    #[must_use]
    pub fn display_name(&self, index: usize, frames: &[Frame]) -> Option<String> {
        let field = self.fields.get(index)?;
        match field.origin {
            Some(origin) => field_display_name(frames, origin),
            None => Some(
                field
                    .config
                    .display_name
                    .clone()
                    .unwrap_or_else(|| field.labeled_name()),
            ),
        }
    }
}
