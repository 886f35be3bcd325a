//! Type-driven theming: container theme, per-card gradient, badge colors

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb};
use crate::types::PokemonType;

pub const DEFAULT_BORDER: &str = "#ffde00";
pub const DEFAULT_BACKGROUND: &str = "rgba(255, 255, 255, 0.15)";
pub const BACKGROUND_ALPHA: f32 = 0.15;
pub const CARD_FALLBACK: &str = "#e63947";
pub const BADGE_FALLBACK: &str = "#A8A878";
/// Stand-in artwork for cards whose own image failed to load.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/140?text=Pokemon";

const CARD_DARKEN_PERCENT: u8 = 20;
const CARD_BORDER_LIGHTEN_PERCENT: u8 = 30;

pub fn base_color(pokemon_type: PokemonType) -> &'static str {
    match pokemon_type {
        PokemonType::Normal => "#A8A878",
        PokemonType::Fire => "#F08030",
        PokemonType::Water => "#6890F0",
        PokemonType::Grass => "#78C850",
        PokemonType::Electric => "#F8D030",
        PokemonType::Ice => "#98D8D8",
        PokemonType::Fighting => "#C03028",
        PokemonType::Poison => "#A040A0",
        PokemonType::Ground => "#E0C068",
        PokemonType::Flying => "#A890F0",
        PokemonType::Psychic => "#F85888",
        PokemonType::Bug => "#A8B820",
        PokemonType::Rock => "#B8A038",
        PokemonType::Ghost => "#705898",
        PokemonType::Dragon => "#7038F8",
        PokemonType::Dark => "#705848",
        PokemonType::Steel => "#B8B8D0",
        PokemonType::Fairy => "#EE99AC",
    }
}

fn palette_lookup(name: &str) -> Option<&'static str> {
    name.parse::<PokemonType>().ok().map(base_color)
}

/// Container colors for the current selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Theme {
    pub border_color: String,
    pub background_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_color: DEFAULT_BORDER.to_string(),
            background_color: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

impl Theme {
    fn from_base(hex: &str) -> Self {
        let background_color = color::rgba(hex, BACKGROUND_ALPHA)
            .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string());
        Self {
            border_color: hex.to_string(),
            background_color,
        }
    }

    pub fn border_rgb(&self) -> Rgb {
        Rgb::parse(&self.border_color)
            .or_else(|| Rgb::parse(DEFAULT_BORDER))
            .unwrap_or(Rgb::WHITE)
    }

    /// The translucent background flattened onto an opaque terminal color.
    pub fn background_over(&self, base: Rgb) -> Rgb {
        match color::parse_rgba(&self.background_color) {
            Some((rgb, alpha)) => rgb.blend_over(alpha, base),
            None => base,
        }
    }
}

pub fn theme_for(selected: Option<PokemonType>) -> Theme {
    theme_for_name(selected.as_ref().map(PokemonType::as_str))
}

/// Unrecognized names keep the default border, tinted like any other type.
fn theme_for_name(selected: Option<&str>) -> Theme {
    match selected.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => Theme::from_base(palette_lookup(name).unwrap_or(DEFAULT_BORDER)),
        None => Theme::default(),
    }
}

/// Diagonal two-tone card background plus a lighter border.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CardGradient {
    pub from: String,
    pub to: String,
    pub border: String,
}

impl CardGradient {
    pub fn rgb(&self) -> (Rgb, Rgb, Rgb) {
        let fallback = Rgb::parse(CARD_FALLBACK).unwrap_or_default();
        let parse = |hex: &str| Rgb::parse(hex).unwrap_or(fallback);
        (parse(&self.from), parse(&self.to), parse(&self.border))
    }
}

pub fn card_gradient(primary_type: Option<&str>) -> CardGradient {
    let from = primary_type
        .and_then(palette_lookup)
        .unwrap_or(CARD_FALLBACK);
    CardGradient {
        from: from.to_string(),
        to: color::darken(from, CARD_DARKEN_PERCENT),
        border: color::lighten(from, CARD_BORDER_LIGHTEN_PERCENT),
    }
}

pub fn badge_color(type_name: &str) -> &'static str {
    palette_lookup(type_name).unwrap_or(BADGE_FALLBACK)
}
