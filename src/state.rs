//! Application state - single source of truth

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::aggregator::{FetchError, PokemonRecord};
use crate::sprite::Sprite;
use crate::theme::{self, Theme};
use crate::types::PokemonType;

pub const SPINNER_TICK_MS: u64 = 90;

/// Lifecycle of the gallery contents. Exactly one variant is active.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(Vec<PokemonRecord>),
    Failed(String),
}

impl FetchState {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Records on success; empty in every other state.
    pub fn records(&self) -> &[PokemonRecord] {
        match self {
            FetchState::Success(records) => records,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Success(_) => "success",
            FetchState::Failed(_) => "failed",
        }
    }
}

/// Per-URL artwork for the cards on screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum ImageState {
    Loading,
    Ready(Sprite),
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    /// `None` is the "select a type" placeholder.
    pub selected: Option<PokemonType>,
    /// Recomputed on every selection change.
    pub theme: Theme,
    pub fetch: FetchState,
    /// Bumped on every selection; results tagged with an older value are stale.
    pub generation: u64,
    pub last_error: Option<FetchError>,
    /// Highlighted picker row; 0 is the placeholder.
    pub picker_index: usize,
    pub gallery_offset: usize,
    pub tick: u64,
    /// Artwork keyed by image URL; cleared on every selection.
    pub images: HashMap<String, ImageState>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppState {
    pub fn new(selected: Option<PokemonType>) -> Self {
        Self {
            terminal_size: (80, 24),
            selected,
            theme: theme::theme_for(selected),
            fetch: FetchState::Idle,
            generation: 0,
            last_error: None,
            picker_index: picker_index_for(selected),
            gallery_offset: 0,
            tick: 0,
            images: HashMap::new(),
        }
    }

    pub fn records(&self) -> &[PokemonRecord] {
        self.fetch.records()
    }

    /// Cards per gallery row for the current terminal width.
    pub fn gallery_columns(&self) -> usize {
        gallery_columns(gallery_width(self.terminal_size.0))
    }

    pub fn gallery_rows(&self) -> usize {
        self.records().len().div_ceil(self.gallery_columns())
    }
}

// Layout shared by the reducer (scroll bounds) and the gallery renderer.
pub const PICKER_WIDTH: u16 = 24;
pub const CARD_WIDTH: u16 = 22;
pub const CARD_HEIGHT: u16 = 10;

/// Inner gallery width once the picker and the outer border are taken.
pub fn gallery_width(terminal_width: u16) -> u16 {
    terminal_width.saturating_sub(PICKER_WIDTH + 2)
}

pub fn gallery_columns(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

/// Picker rows: the placeholder followed by every type.
pub const PICKER_LEN: usize = PokemonType::ALL.len() + 1;

pub fn picker_option(index: usize) -> Option<PokemonType> {
    index
        .checked_sub(1)
        .and_then(|i| PokemonType::ALL.get(i).copied())
}

pub fn picker_index_for(selected: Option<PokemonType>) -> usize {
    selected.map(|pokemon_type| pokemon_type.index() + 1).unwrap_or(0)
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Selection")
                .entry("type", ron_string(&self.selected))
                .entry("picker_index", ron_string(&self.picker_index))
                .entry("border", ron_string(&self.theme.border_color))
                .entry("background", ron_string(&self.theme.background_color)),
            DebugSection::new("Fetch")
                .entry("state", ron_string(&self.fetch.label()))
                .entry("generation", ron_string(&self.generation))
                .entry("records", ron_string(&self.records().len()))
                .entry(
                    "last_error",
                    ron_string(&self.last_error.as_ref().map(|err| err.to_string())),
                ),
            DebugSection::new("Gallery")
                .entry("offset", ron_string(&self.gallery_offset))
                .entry("images", ron_string(&self.images.len()))
                .entry("terminal", ron_string(&self.terminal_size)),
        ]
    }
}
