use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{FetchError, PokemonRecord};
use crate::sprite::Sprite;
use crate::types::PokemonType;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,

    /// Pick a type; `None` is the placeholder and stops at `Idle`.
    TypeSelect(Option<PokemonType>),
    /// Run the full fetch again for the current selection.
    TypeRetry,

    PickerMove(usize),

    FetchDidLoad {
        generation: u64,
        records: Vec<PokemonRecord>,
    },
    FetchDidError {
        generation: u64,
        error: FetchError,
    },

    ImageDidLoad {
        url: String,
        sprite: Sprite,
    },
    ImageDidError {
        url: String,
        error: String,
    },

    GalleryScroll(i16),

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
