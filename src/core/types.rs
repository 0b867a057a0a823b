use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Visible time window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: f64,
    pub to: f64,
}

impl TimeRange {
    pub fn new(from: f64, to: f64) -> PlotResult<Self> {
        if !from.is_finite() || !to.is_finite() || from >= to {
            return Err(PlotError::InvalidData(format!(
                "time range must be finite and ascending, got {from}..{to}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from_datetimes(from: DateTime<Utc>, to: DateTime<Utc>) -> PlotResult<Self> {
        Self::new(from.timestamp_millis() as f64, to.timestamp_millis() as f64)
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.to - self.from
    }
}
