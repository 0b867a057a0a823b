//! plot-prep: turns independently queried data frames into one aligned,
//! renderer-ready plot configuration, and keeps hover state in step across
//! chart instances.
//!
//! The pipeline is synchronous and rebuilt from scratch on every input
//! change; only [`interaction::CursorSyncCoordinator`] talks across
//! instances, over a shared [`interaction::CursorBus`].

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{PlotConfig, PlotConfigBuilder, PlotOptions, PreparedPlot, prepare_plot};
pub use error::{PlotError, PlotResult};
