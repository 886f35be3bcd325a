//! Selection and fetch lifecycle through the store
//!
//! Selections go in as actions; fetch outcomes come back as tagged
//! completions, the way the effect handler delivers them.

use tui_dispatch::testing::*;
use tui_dispatch::{assert_emitted, assert_not_emitted, EffectStore, NumericComponentId};
use typedex::{
    action::Action,
    aggregator::{FetchError, PokemonRecord, USER_MESSAGE},
    components::{Component, PokedexView, PokedexViewProps},
    effect::Effect,
    reducer::reducer,
    state::{AppState, FetchState, ImageState},
    theme::{self, PLACEHOLDER_IMAGE_URL},
    types::PokemonType,
};

fn fire_records() -> Vec<PokemonRecord> {
    ["charmander", "charmeleon", "charizard"]
        .into_iter()
        .map(|name| PokemonRecord {
            name: name.into(),
            image_url: Some(format!("https://img/{name}.png")),
            types: vec!["fire".into()],
        })
        .collect()
}

#[test]
fn test_select_fetch_and_load() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::TypeSelect(Some(PokemonType::Fire)));
    harness.assert_state(|s| s.fetch.is_loading());
    harness.assert_state(|s| s.theme.border_color == "#F08030");
    harness.assert_state(|s| s.theme.background_color == "rgba(240, 128, 48, 0.15)");

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| {
        matches!(
            e,
            Effect::FetchByType {
                pokemon_type: PokemonType::Fire,
                ..
            }
        )
    });

    harness.complete_action(Action::FetchDidLoad {
        generation: 1,
        records: fire_records(),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!(total, 1);
    assert_eq!(changed, 1);

    harness.assert_state(|s| s.records().len() == 3);
    harness.assert_state(|s| s.records()[0].name == "charmander");
    harness.assert_state(|s| s.fetch.error().is_none());
}

#[test]
fn test_error_surfaces_single_message() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::TypeSelect(Some(PokemonType::Water)));
    harness.complete_action(Action::FetchDidError {
        generation: 1,
        error: FetchError::DetailUnavailable {
            name: "psyduck".into(),
            reason: "unexpected status 500".into(),
        },
    });
    harness.process_emitted();

    harness.assert_state(|s| s.fetch.error() == Some(USER_MESSAGE));
    harness.assert_state(|s| s.records().is_empty());
    harness.assert_state(|s| {
        s.last_error
            .as_ref()
            .is_some_and(|err| err.kind() == "detail_unavailable")
    });
}

#[test]
fn test_placeholder_returns_to_idle_without_fetch() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::TypeSelect(Some(PokemonType::Grass)));
    harness.drain_effects().effects_count(1);

    harness.dispatch_collect(Action::TypeSelect(None));
    harness.assert_state(|s| s.fetch.is_idle());
    harness.assert_state(|s| s.theme == theme::theme_for(None));
    harness.drain_effects().effects_empty();
}

#[test]
fn test_latest_selection_wins() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::TypeSelect(Some(PokemonType::Fire)));
    harness.dispatch_collect(Action::TypeSelect(Some(PokemonType::Water)));
    let effects = harness.drain_effects();
    effects.effects_count(2);

    // The fire fetch finishes after water was picked.
    harness.complete_action(Action::FetchDidLoad {
        generation: 1,
        records: fire_records(),
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
    harness.assert_state(|s| s.fetch.is_loading());

    let water = vec![PokemonRecord {
        name: "squirtle".into(),
        image_url: None,
        types: vec!["water".into()],
    }];
    harness.complete_action(Action::FetchDidLoad {
        generation: 2,
        records: water,
    });
    harness.process_emitted();
    harness.assert_state(|s| s.records().len() == 1 && s.records()[0].name == "squirtle");
}

#[test]
fn test_retry_after_failure() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    store.dispatch(Action::TypeSelect(Some(PokemonType::Ghost)));
    store.dispatch(Action::FetchDidError {
        generation: 1,
        error: FetchError::ListingUnavailable {
            pokemon_type: "ghost".into(),
            reason: "request failed: timed out".into(),
        },
    });
    assert_eq!(store.state().fetch, FetchState::Failed(USER_MESSAGE.into()));

    let result = store.dispatch(Action::TypeRetry);
    assert!(result.changed);
    assert!(store.state().fetch.is_loading());
    assert_eq!(
        result.effects,
        vec![Effect::FetchByType {
            pokemon_type: PokemonType::Ghost,
            generation: 2,
        }]
    );
}

#[test]
fn test_keyboard_retry_through_view() {
    let mut harness =
        EffectStoreTestHarness::new(AppState::new(Some(PokemonType::Dragon)), reducer);
    let mut view = PokedexView::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("r", |state, event| {
        let props = PokedexViewProps {
            state,
            is_focused: true,
        };
        view.handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::TypeRetry);

    for action in actions {
        harness.dispatch_collect(action);
    }
    harness.assert_state(|s| s.fetch.is_loading());
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::FetchByType { .. }));
}

#[test]
fn test_render_after_load() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    let mut view = PokedexView::new();

    harness.dispatch_collect(Action::UiTerminalResize(100, 30));
    harness.dispatch_collect(Action::TypeSelect(Some(PokemonType::Fire)));
    harness.complete_action(Action::FetchDidLoad {
        generation: 1,
        records: fire_records(),
    });
    harness.process_emitted();

    let output = harness.render_plain(100, 30, |frame, area, state| {
        let props = PokedexViewProps {
            state,
            is_focused: true,
        };
        view.render(frame, area, props);
    });

    assert!(output.contains("Charmander"), "missing card:\n{output}");
    assert!(output.contains("Charmeleon"));
    assert!(output.contains("Charizard"));
}

#[test]
fn test_artwork_requested_after_load() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::TypeSelect(Some(PokemonType::Fire)));
    harness.drain_effects().effects_count(1);

    harness.dispatch_collect(Action::FetchDidLoad {
        generation: 1,
        records: fire_records(),
    });
    let effects = harness.drain_effects();
    effects.effects_count(3);
    effects.effects_first_matches(|e| {
        matches!(e, Effect::FetchImage { url } if url == "https://img/charmander.png")
    });

    harness.dispatch_collect(Action::ImageDidError {
        url: "https://img/charizard.png".into(),
        error: "unexpected status 404".into(),
    });
    harness.assert_state(|s| {
        s.images.get("https://img/charizard.png") == Some(&ImageState::Failed)
    });
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(
        |e| matches!(e, Effect::FetchImage { url } if url == PLACEHOLDER_IMAGE_URL),
    );
}

#[test]
fn test_action_categories() {
    let loaded = Action::FetchDidLoad {
        generation: 1,
        records: Vec::new(),
    };
    let resize = Action::UiTerminalResize(80, 24);

    assert_eq!(loaded.category(), Some("fetch_did"));
    assert_eq!(resize.category(), Some("ui"));
    assert_eq!(Action::Tick.category(), None);
    assert!(loaded.is_fetch_did());
    assert!(resize.is_ui());
}

#[test]
fn test_assert_emitted_macro() {
    let actions = vec![Action::TypeSelect(Some(PokemonType::Ice)), Action::TypeRetry];

    assert_emitted!(actions, Action::TypeSelect(Some(_)));
    assert_emitted!(actions, Action::TypeRetry);
    assert_not_emitted!(actions, Action::Quit);
    assert_not_emitted!(actions, Action::FetchDidError { .. });
}
