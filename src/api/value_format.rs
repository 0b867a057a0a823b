use std::fmt;

use chrono::DateTime;

use crate::core::Value;

pub const PERCENT_UNIT: &str = "percentunit";

const SHORT_SUFFIXES: &[&str] = &["", " K", " Mil", " Bil", " Tri"];
const BYTE_SUFFIXES: &[&str] = &[" B", " KiB", " MiB", " GiB", " TiB"];

/// Formatted value split into display parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedValue {
    pub text: String,
    pub suffix: String,
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.text, self.suffix)
    }
}

/// Unit-aware number formatter attached to series and axes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueFormat {
    pub unit: Option<String>,
    pub decimals: Option<u8>,
}

impl ValueFormat {
    #[must_use]
    pub fn new(unit: Option<String>, decimals: Option<u8>) -> Self {
        Self { unit, decimals }
    }

    /// Formatter for 0..=1 fractions shown as percentages.
    #[must_use]
    pub fn percent_unit(decimals: Option<u8>) -> Self {
        Self::new(Some(PERCENT_UNIT.to_owned()), decimals)
    }

    #[must_use]
    pub fn format(&self, value: &Value) -> FormattedValue {
        match value {
            Value::Number(number) => self.format_number(*number),
            Value::Text(text) => FormattedValue {
                text: text.clone(),
                suffix: String::new(),
            },
            Value::Bool(flag) => FormattedValue {
                text: flag.to_string(),
                suffix: String::new(),
            },
            Value::Null | Value::Undefined => FormattedValue::default(),
        }
    }

    #[must_use]
    pub fn format_number(&self, value: f64) -> FormattedValue {
        if value.is_nan() {
            return plain("NaN".to_owned(), "");
        }
        if value.is_infinite() {
            let text = if value > 0.0 { "Inf" } else { "-Inf" };
            return plain(text.to_owned(), "");
        }

        let decimals = self.decimals;
        match self.unit.as_deref() {
            None | Some("" | "none") => plain(to_fixed(value, decimals), ""),
            Some("short") => scaled(value, 1000.0, SHORT_SUFFIXES, decimals),
            Some("bytes") => scaled(value, 1024.0, BYTE_SUFFIXES, decimals),
            Some("percent") => plain(to_fixed(value, decimals), "%"),
            Some(PERCENT_UNIT) => plain(to_fixed(value * 100.0, decimals), "%"),
            Some("ms") => duration_ms(value, decimals),
            Some("s") => duration_s(value, decimals),
            Some("dateTimeAsIso") => match DateTime::from_timestamp_millis(value as i64) {
                Some(date) => plain(date.format("%Y-%m-%d %H:%M:%S").to_string(), ""),
                None => plain(to_fixed(value, decimals), ""),
            },
            Some(other) => FormattedValue {
                text: to_fixed(value, decimals),
                suffix: format!(" {other}"),
            },
        }
    }
}

fn plain(text: String, suffix: &str) -> FormattedValue {
    FormattedValue {
        text,
        suffix: suffix.to_owned(),
    }
}

/// Fixed decimals when given, otherwise at most two with trailing zeros
/// trimmed.
fn to_fixed(value: f64, decimals: Option<u8>) -> String {
    match decimals {
        Some(decimals) => format!("{:.*}", usize::from(decimals), value),
        None => {
            let text = format!("{value:.2}");
            let trimmed = text.trim_end_matches('0').trim_end_matches('.');
            if trimmed == "-0" {
                "0".to_owned()
            } else {
                trimmed.to_owned()
            }
        }
    }
}

fn scaled(value: f64, step: f64, suffixes: &[&str], decimals: Option<u8>) -> FormattedValue {
    let mut scaled = value;
    let mut level = 0;
    while scaled.abs() >= step && level + 1 < suffixes.len() {
        scaled /= step;
        level += 1;
    }
    plain(to_fixed(scaled, decimals), suffixes[level])
}

fn duration_ms(value: f64, decimals: Option<u8>) -> FormattedValue {
    if value.abs() < 1000.0 {
        plain(to_fixed(value, decimals), " ms")
    } else {
        duration_s(value / 1000.0, decimals)
    }
}

fn duration_s(value: f64, decimals: Option<u8>) -> FormattedValue {
    let abs = value.abs();
    if abs < 60.0 {
        plain(to_fixed(value, decimals), " s")
    } else if abs < 3600.0 {
        plain(to_fixed(value / 60.0, decimals), " min")
    } else if abs < 86_400.0 {
        plain(to_fixed(value / 3600.0, decimals), " hour")
    } else {
        plain(to_fixed(value / 86_400.0, decimals), " day")
    }
}
