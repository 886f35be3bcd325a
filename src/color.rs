//! Hex color arithmetic used to theme the gallery
//!
//! Lighten/darken are a per-channel linear shift, not an HSL transform: the
//! percent becomes an additive amount `round(2.55 * percent)` that is added to
//! (or subtracted from) each 8-bit channel, and each channel saturates at 0/255
//! on its own.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit hex color, with or without a leading `#`.
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Add `amount` to every channel, clamping each one to [0, 255].
    pub fn shift(&self, amount: i32) -> Self {
        let channel = |value: u8| (i32::from(value) + amount).clamp(0, 255) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }

    /// Decimal channels joined for an `rgba()` color: `"240, 128, 48"`.
    pub fn components(&self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }

    /// Composite this color at `alpha` over an opaque `under` color.
    pub fn blend_over(&self, alpha: f32, under: Rgb) -> Rgb {
        let alpha = alpha.clamp(0.0, 1.0);
        let channel = |top: u8, bottom: u8| {
            (f32::from(top) * alpha + f32::from(bottom) * (1.0 - alpha)).round() as u8
        };
        Rgb {
            r: channel(self.r, under.r),
            g: channel(self.g, under.g),
            b: channel(self.b, under.b),
        }
    }

    /// Linear interpolation toward `other`; `t` of 0 is `self`, 1 is `other`.
    pub fn mix(&self, other: Rgb, t: f32) -> Rgb {
        other.blend_over(t, *self)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(rgb: Rgb) -> Self {
        ratatui::style::Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// `round(2.55 * percent)`, with percent capped at 100.
pub fn percent_amount(percent: u8) -> i32 {
    (2.55_f64 * f64::from(percent.min(100))).round() as i32
}

/// Lighten a hex color by `percent`. Malformed input is returned unchanged.
pub fn lighten(hex: &str, percent: u8) -> String {
    match Rgb::parse(hex) {
        Some(rgb) => rgb.shift(percent_amount(percent)).to_hex(),
        None => hex.to_string(),
    }
}

/// Darken a hex color by `percent`. Malformed input is returned unchanged.
pub fn darken(hex: &str, percent: u8) -> String {
    match Rgb::parse(hex) {
        Some(rgb) => rgb.shift(-percent_amount(percent)).to_hex(),
        None => hex.to_string(),
    }
}

pub fn hex_to_rgb_components(hex: &str) -> Option<String> {
    Rgb::parse(hex).map(|rgb| rgb.components())
}

pub fn rgba(hex: &str, alpha: f32) -> Option<String> {
    hex_to_rgb_components(hex).map(|components| format!("rgba({components}, {alpha})"))
}

/// Parse an `rgba(r, g, b, a)` string back into its color and alpha.
pub fn parse_rgba(value: &str) -> Option<(Rgb, f32)> {
    let inner = value.trim().strip_prefix("rgba(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let r = parts.next()?.parse().ok()?;
    let g = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    let alpha = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((Rgb::new(r, g, b), alpha))
}
