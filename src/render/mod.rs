mod color;
mod null_renderer;
mod theme;

pub use color::Color;
pub use null_renderer::NullRenderer;
pub use theme::{Theme, ThemeKind};

use crate::api::PreparedPlot;
use crate::error::PlotResult;

/// Hand-off point to the library that paints a finished configuration.
///
/// Implementations receive the aligned data and an immutable config; they
/// report lifecycle events back through the config's hooks.
pub trait Renderer {
    fn mount(&mut self, plot: &PreparedPlot) -> PlotResult<()>;
}
