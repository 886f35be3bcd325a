//! Typedex - browse Pokémon by type

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};
use typedex::action::Action;
use typedex::aggregator::PokemonAggregator;
use typedex::api::{ApiConfig, HttpSource};
use typedex::components::{Component, PokedexView, PokedexViewProps};
use typedex::effect::Effect;
use typedex::logging;
use typedex::reducer::reducer;
use typedex::sprite::{self, SPRITE_PIXELS};
use typedex::state::{AppState, SPINNER_TICK_MS};
use typedex::types::PokemonType;

/// Typedex - Pokémon gallery filtered by elemental type
#[derive(Parser, Debug)]
#[command(name = "typedex")]
#[command(about = "Browse Pokémon by type, themed by the selected type's color")]
struct Args {
    /// Type to load on startup
    #[arg(long = "type", short = 't', value_enum)]
    pokemon_type: Option<PokemonType>,

    /// PokeAPI base URL (overrides POKEAPI_BASE_URL)
    #[arg(long)]
    api_base: Option<String>,

    /// Maximum concurrent detail requests
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    concurrency: Option<u16>,

    /// Log file path (defaults to typedex.log in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum TypedexComponentId {
    Pokedex,
    Gallery,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum TypedexContext {
    Main,
}

impl EventRoutingState<TypedexComponentId, TypedexContext> for AppState {
    fn focused(&self) -> Option<TypedexComponentId> {
        Some(TypedexComponentId::Pokedex)
    }

    fn modal(&self) -> Option<TypedexComponentId> {
        None
    }

    fn binding_context(&self, _id: TypedexComponentId) -> TypedexContext {
        TypedexContext::Main
    }

    fn default_context(&self) -> TypedexContext {
        TypedexContext::Main
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        pokemon_type,
        api_base,
        concurrency,
        log_file,
        debug: debug_args,
    } = Args::parse();

    let log_path = log_file.unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;

    let mut config = ApiConfig::from_env();
    if let Some(base_url) = api_base {
        config.base_url = base_url;
    }
    if let Some(concurrency) = concurrency {
        config.detail_concurrency = usize::from(concurrency);
    }
    tracing::info!(
        base_url = %config.base_url,
        concurrency = config.detail_concurrency,
        log = %log_path.display(),
        "starting typedex"
    );

    let debug = DebugSession::new(debug_args);

    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(pokemon_type))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, config).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct TypedexUi {
    view: PokedexView,
}

impl TypedexUi {
    fn new() -> Self {
        Self {
            view: PokedexView::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<TypedexComponentId>,
    ) {
        let (_, gallery_area) = PokedexView::layout(area);
        event_ctx.set_component_area(TypedexComponentId::Pokedex, area);
        event_ctx.set_component_area(TypedexComponentId::Gallery, gallery_area);

        let props = PokedexViewProps {
            state,
            is_focused: render_ctx.is_focused(),
        };
        self.view.render(frame, area, props);
    }

    fn handle_pokedex_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = PokedexViewProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.view.handle_event(event, props).into_iter().collect();
        handler_response(actions)
    }

    fn handle_gallery_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handler_response(self.view.handle_gallery_event(event, state))
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    config: ApiConfig,
) -> io::Result<DebugRunOutput<AppState>> {
    let concurrency = config.detail_concurrency;
    let source = Arc::new(HttpSource::new(config));
    let aggregator = Arc::new(PokemonAggregator::new(source.clone(), concurrency));

    let ui = Rc::new(RefCell::new(TypedexUi::new()));
    let mut bus: EventBus<AppState, Action, TypedexComponentId, TypedexContext> = EventBus::new();
    let keybindings: Keybindings<TypedexContext> = Keybindings::new();

    let ui_pokedex = Rc::clone(&ui);
    bus.register(TypedexComponentId::Pokedex, move |event, state| {
        ui_pokedex
            .borrow_mut()
            .handle_pokedex_event(&event.kind, state)
    });

    let ui_gallery = Rc::clone(&ui);
    bus.register(TypedexComponentId::Gallery, move |event, state| {
        ui_gallery
            .borrow_mut()
            .handle_gallery_event(&event.kind, state)
    });

    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| {
                handle_effect(effect, ctx, Arc::clone(&aggregator), Arc::clone(&source))
            },
        )
        .await
}

/// Handle effects by spawning tasks
fn handle_effect(
    effect: Effect,
    ctx: &mut EffectContext<Action>,
    aggregator: Arc<PokemonAggregator>,
    source: Arc<HttpSource>,
) {
    match effect {
        Effect::FetchByType {
            pokemon_type,
            generation,
        } => {
            // Same key: a new selection replaces the fetch still in flight.
            ctx.tasks()
                .spawn(TaskKey::new("pokemon_by_type"), async move {
                    match aggregator.fetch_by_type(pokemon_type).await {
                        Ok(records) => Action::FetchDidLoad {
                            generation,
                            records,
                        },
                        Err(error) => Action::FetchDidError { generation, error },
                    }
                });
        }
        Effect::FetchImage { url } => {
            let key = format!("image_{url}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let bytes = match source.fetch_bytes(&url).await {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        return Action::ImageDidError {
                            url,
                            error: error.to_string(),
                        }
                    }
                };
                let decoded =
                    tokio::task::spawn_blocking(move || sprite::decode_sprite(&bytes, SPRITE_PIXELS))
                        .await;
                match decoded {
                    Ok(Ok(sprite)) => Action::ImageDidLoad { url, sprite },
                    Ok(Err(error)) => Action::ImageDidError { url, error },
                    Err(error) => Action::ImageDidError {
                        url,
                        error: error.to_string(),
                    },
                }
            });
        }
    }
}
