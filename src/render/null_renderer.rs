use crate::api::PreparedPlot;
use crate::error::{PlotError, PlotResult};
use crate::extensions::HookPayload;
use crate::render::Renderer;

/// No-op renderer used by tests and headless usage.
///
/// It still checks that every series and band references something the
/// configuration defines, so broken configs surface before a real backend
/// is involved.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_series_count: usize,
    pub last_band_count: usize,
    pub last_row_count: usize,
}

impl Renderer for NullRenderer {
    fn mount(&mut self, plot: &PreparedPlot) -> PlotResult<()> {
        let config = &plot.config;
        for series in config.series() {
            if config.scale(&series.scale_key).is_none() {
                return Err(PlotError::InvalidData(format!(
                    "series `{}` references unknown scale `{}`",
                    series.display_name, series.scale_key
                )));
            }
        }
        for band in config.bands() {
            for index in [band.series_a, band.series_b] {
                if config.series_for_field(index).is_none() {
                    return Err(PlotError::InvalidData(format!(
                        "band references field {index} with no series"
                    )));
                }
            }
        }

        self.last_series_count = config.series().len();
        self.last_band_count = config.bands().len();
        self.last_row_count = plot.frame.row_count();
        config.dispatch(&HookPayload::Init {
            series_count: self.last_series_count,
        });
        Ok(())
    }
}
