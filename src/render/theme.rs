use tracing::warn;

use crate::core::field_config::{ColorConfig, ColorMode, ThresholdsConfig};
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

/// Named visualization colors as (name, dark, light).
const NAMED_COLORS: &[(&str, &str, &str)] = &[
    ("green", "#73bf69", "#56a64b"),
    ("red", "#f2495c", "#e02f44"),
    ("blue", "#5794f2", "#3274d9"),
    ("yellow", "#fade2a", "#e0b400"),
    ("orange", "#ff9830", "#ff780a"),
    ("purple", "#b877d9", "#a352cc"),
    ("text", "#ccccdc", "#24292e"),
];

const CLASSIC_PALETTE: &[&str] = &[
    "#7eb26d", "#eab839", "#6ed0e0", "#ef843c", "#e24d42", "#1f78c1", "#ba43a6", "#705da0",
    "#508642", "#cca300",
];

const FALLBACK_COLOR: Color = Color::rgb(0.5, 0.5, 0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Theme {
    pub kind: ThemeKind,
}

impl Theme {
    #[must_use]
    pub fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
        }
    }

    #[must_use]
    pub fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
        }
    }

    /// Resolves a named color or a hex literal for this theme.
    #[must_use]
    pub fn color(&self, name: &str) -> Option<Color> {
        let lowered = name.to_ascii_lowercase();
        if let Some((_, dark, light)) = NAMED_COLORS.iter().find(|(key, _, _)| *key == lowered) {
            let hex = match self.kind {
                ThemeKind::Dark => dark,
                ThemeKind::Light => light,
            };
            return Color::from_hex(hex).ok();
        }
        Color::from_hex(name).ok()
    }

    #[must_use]
    pub fn palette_color(&self, index: usize) -> Color {
        let hex = CLASSIC_PALETTE[index % CLASSIC_PALETTE.len()];
        Color::from_hex(hex).unwrap_or(FALLBACK_COLOR)
    }

    /// Picks a series color from the field's color mode.
    ///
    /// `series_index` feeds the classic palette. Unknown names fall back to
    /// the palette so one bad entry never blanks a series.
    #[must_use]
    pub fn series_color(
        &self,
        color: Option<&ColorConfig>,
        thresholds: Option<&ThresholdsConfig>,
        series_index: usize,
    ) -> Color {
        let palette = self.palette_color(series_index);
        let Some(color) = color else {
            return palette;
        };

        let named = match color.mode {
            ColorMode::PaletteClassic => return palette,
            ColorMode::Fixed => color.fixed_color.as_deref(),
            ColorMode::Thresholds => thresholds.and_then(ThresholdsConfig::base_color),
        };
        match named {
            Some(name) => self.color(name).unwrap_or_else(|| {
                warn!(color = name, "unknown color; using palette color");
                palette
            }),
            None => palette,
        }
    }
}
