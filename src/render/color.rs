use crate::error::{PlotError, PlotResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> PlotResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(PlotError::InvalidData(format!(
                "color `{hex}` is not #rrggbb or #rrggbbaa"
            )));
        }

        let mut channels = [1.0f64; 4];
        for (slot, chunk) in channels.iter_mut().zip(digits.as_bytes().chunks(2)) {
            let text = std::str::from_utf8(chunk).map_err(|_| {
                PlotError::InvalidData(format!("color `{hex}` is not valid ascii"))
            })?;
            let byte = u8::from_str_radix(text, 16)
                .map_err(|_| PlotError::InvalidData(format!("color `{hex}` is not hex")))?;
            *slot = f64::from(byte) / 255.0;
        }
        Ok(Self::rgba(channels[0], channels[1], channels[2], channels[3]))
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.alpha >= 1.0 {
            format!(
                "#{:02x}{:02x}{:02x}",
                channel(self.red),
                channel(self.green),
                channel(self.blue)
            )
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                channel(self.red),
                channel(self.green),
                channel(self.blue),
                channel(self.alpha)
            )
        }
    }
}
