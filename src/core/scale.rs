use serde::{Deserialize, Serialize};

use crate::core::types::{TimeRange, Viewport};
use crate::error::{PlotError, PlotResult};

/// Direction a scale runs on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Linear value-to-pixel projection used for hover distance checks.
///
/// Vertical scales grow upwards, so the domain start maps to the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    orientation: Orientation,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64, orientation: Orientation) -> PlotResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(PlotError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            orientation,
        })
    }

    /// Horizontal scale spanning the visible time window.
    pub fn for_time_range(range: TimeRange) -> PlotResult<Self> {
        Self::new(range.from, range.to, Orientation::Horizontal)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn orientation(self) -> Orientation {
        self.orientation
    }

    fn extent(self, viewport: Viewport) -> PlotResult<f64> {
        if !viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(match self.orientation {
            Orientation::Horizontal => f64::from(viewport.width),
            Orientation::Vertical => f64::from(viewport.height),
        })
    }

    pub fn value_to_pixel(self, value: f64, viewport: Viewport) -> PlotResult<f64> {
        let extent = self.extent(viewport)?;
        if !value.is_finite() {
            return Err(PlotError::InvalidData("value must be finite".to_owned()));
        }

        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        Ok(match self.orientation {
            Orientation::Horizontal => normalized * extent,
            Orientation::Vertical => (1.0 - normalized) * extent,
        })
    }

    pub fn pixel_to_value(self, pixel: f64, viewport: Viewport) -> PlotResult<f64> {
        let extent = self.extent(viewport)?;
        if !pixel.is_finite() {
            return Err(PlotError::InvalidData("pixel must be finite".to_owned()));
        }

        let normalized = match self.orientation {
            Orientation::Horizontal => pixel / extent,
            Orientation::Vertical => 1.0 - pixel / extent,
        };
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }
}
