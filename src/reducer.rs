//! Reducer - pure function: (state, action) -> DispatchResult
//!
//! Fetch lifecycle:
//!
//! | from                  | action                  | to                 |
//! |-----------------------|-------------------------|--------------------|
//! | any                   | `TypeSelect(None)`      | `Idle`, no effect  |
//! | any                   | `TypeSelect(Some(t))`   | `Loading` + fetch  |
//! | `Loading`             | `FetchDidLoad` (fresh)  | `Success(records)` |
//! | `Loading`             | `FetchDidError` (fresh) | `Failed(message)`  |
//!
//! Results tagged with an older generation are dropped.
//!
//! Loaded records start one image fetch per artwork URL. A failed image falls
//! back to the placeholder artwork, fetched once per selection.

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::aggregator::PokemonRecord;
use crate::state::{picker_index_for, AppState, FetchState, ImageState, PICKER_LEN};
use crate::theme::{self, PLACEHOLDER_IMAGE_URL};
use crate::types::PokemonType;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => match state.selected {
            Some(pokemon_type) => select_type(state, Some(pokemon_type)),
            None => DispatchResult::unchanged(),
        },

        Action::TypeSelect(selection) => select_type(state, selection),

        Action::TypeRetry => match state.selected {
            Some(pokemon_type) => select_type(state, Some(pokemon_type)),
            None => DispatchResult::unchanged(),
        },

        Action::PickerMove(index) => {
            let index = index.min(PICKER_LEN - 1);
            if index == state.picker_index {
                return DispatchResult::unchanged();
            }
            state.picker_index = index;
            DispatchResult::changed()
        }

        Action::FetchDidLoad {
            generation,
            records,
        } => {
            if !is_current(state, generation) {
                tracing::debug!(generation, current = state.generation, "dropping stale result");
                return DispatchResult::unchanged();
            }
            let effects = request_images(state, &records);
            state.fetch = FetchState::Success(records);
            state.last_error = None;
            state.gallery_offset = 0;
            DispatchResult::changed_with_many(effects)
        }

        Action::FetchDidError { generation, error } => {
            if !is_current(state, generation) {
                tracing::debug!(generation, current = state.generation, "dropping stale error");
                return DispatchResult::unchanged();
            }
            tracing::warn!(kind = error.kind(), %error, "fetch failed");
            state.fetch = FetchState::Failed(error.user_message().to_string());
            state.last_error = Some(error);
            state.gallery_offset = 0;
            DispatchResult::changed()
        }

        Action::ImageDidLoad { url, sprite } => {
            if !is_pending(state, &url) {
                return DispatchResult::unchanged();
            }
            state.images.insert(url, ImageState::Ready(sprite));
            DispatchResult::changed()
        }

        Action::ImageDidError { url, error } => {
            if !is_pending(state, &url) {
                return DispatchResult::unchanged();
            }
            tracing::debug!(%url, %error, "image failed to load");
            state.images.insert(url, ImageState::Failed);
            if state.images.contains_key(PLACEHOLDER_IMAGE_URL) {
                return DispatchResult::changed();
            }
            state
                .images
                .insert(PLACEHOLDER_IMAGE_URL.to_string(), ImageState::Loading);
            DispatchResult::changed_with(Effect::FetchImage {
                url: PLACEHOLDER_IMAGE_URL.to_string(),
            })
        }

        Action::GalleryScroll(delta) => {
            let max_offset = state.gallery_rows().saturating_sub(1);
            let next = if delta < 0 {
                state.gallery_offset.saturating_sub(delta.unsigned_abs() as usize)
            } else {
                (state.gallery_offset + delta as usize).min(max_offset)
            };
            if next == state.gallery_offset {
                return DispatchResult::unchanged();
            }
            state.gallery_offset = next;
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            state.terminal_size = (width, height);
            state.gallery_offset = state
                .gallery_offset
                .min(state.gallery_rows().saturating_sub(1));
            DispatchResult::changed()
        }

        Action::Tick => {
            if state.fetch.is_loading() {
                state.tick = state.tick.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Every selection starts a new generation, so whatever is still in flight
/// for the previous one can no longer land.
fn select_type(state: &mut AppState, selection: Option<PokemonType>) -> DispatchResult<Effect> {
    state.selected = selection;
    state.theme = theme::theme_for(selection);
    state.picker_index = picker_index_for(selection);
    state.generation = state.generation.wrapping_add(1);
    state.last_error = None;
    state.gallery_offset = 0;
    state.tick = 0;
    state.images.clear();

    match selection {
        Some(pokemon_type) => {
            state.fetch = FetchState::Loading;
            DispatchResult::changed_with(Effect::FetchByType {
                pokemon_type,
                generation: state.generation,
            })
        }
        None => {
            state.fetch = FetchState::Idle;
            DispatchResult::changed()
        }
    }
}

fn is_current(state: &AppState, generation: u64) -> bool {
    generation == state.generation && state.fetch.is_loading()
}

/// Image results only land for URLs this selection asked for.
fn is_pending(state: &AppState, url: &str) -> bool {
    matches!(state.images.get(url), Some(ImageState::Loading))
}

fn request_images(state: &mut AppState, records: &[PokemonRecord]) -> Vec<Effect> {
    let mut effects = Vec::new();
    for url in records.iter().filter_map(|record| record.image_url.as_ref()) {
        if state.images.contains_key(url) {
            continue;
        }
        state.images.insert(url.clone(), ImageState::Loading);
        effects.push(Effect::FetchImage { url: url.clone() });
    }
    effects
}
