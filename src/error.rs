use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A field reports a row count that differs from its frame.
    #[error("field `{field}` in frame {frame} has {actual} values, frame has {expected} rows")]
    FieldLengthMismatch {
        frame: usize,
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid field config: {0}")]
    InvalidFieldConfig(#[from] serde_json::Error),
}
