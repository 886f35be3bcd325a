use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Layout};
use ratatui::prelude::{Frame, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{Component, Gallery, GalleryProps, TypePicker, TypePickerProps};
use crate::action::Action;
use crate::color::Rgb;
use crate::state::{AppState, PICKER_WIDTH};

/// Terminal color the translucent theme background is flattened onto.
pub const BASE_BACKGROUND: Rgb = Rgb::new(16, 18, 20);

pub struct PokedexViewProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Root view: themed container around the picker and the gallery.
pub struct PokedexView {
    picker: TypePicker,
    gallery: Gallery,
    status_bar: StatusBar,
}

impl Default for PokedexView {
    fn default() -> Self {
        Self::new()
    }
}

impl PokedexView {
    pub fn new() -> Self {
        Self {
            picker: TypePicker::new(),
            gallery: Gallery,
            status_bar: StatusBar::new(),
        }
    }

    /// Mouse wheel over the gallery.
    pub fn handle_gallery_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> Vec<Action> {
        self.gallery
            .handle_event(event, gallery_props(state, true))
            .into_iter()
            .collect()
    }

    /// Areas of the picker and the gallery for a given root area.
    pub fn layout(area: Rect) -> (Rect, Rect) {
        let inner = container_block(Rgb::WHITE).inner(area);
        let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        let columns =
            Layout::horizontal([Constraint::Length(PICKER_WIDTH), Constraint::Min(1)]).split(rows[0]);
        (columns[0], columns[1])
    }
}

impl Component<Action> for PokedexView {
    type Props<'a> = PokedexViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let state = props.state;

        if let EventKind::Key(key) = event {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return vec![Action::Quit],
                KeyCode::Char('r') | KeyCode::F(5) => return vec![Action::TypeRetry],
                _ => {}
            }
        }

        let actions: Vec<_> = self
            .gallery
            .handle_event(event, gallery_props(state, true))
            .into_iter()
            .collect();
        if !actions.is_empty() {
            return actions;
        }

        self.picker
            .handle_event(event, picker_props(state, true))
            .into_iter()
            .collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: PokedexViewProps<'_>) {
        let state = props.state;
        let border = state.theme.border_rgb();
        let background = state.theme.background_over(BASE_BACKGROUND);

        let block = container_block(border).style(Style::default().bg(Color::from(background)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        let (picker_area, gallery_area) = Self::layout(area);

        self.picker
            .render(frame, picker_area, picker_props(state, props.is_focused));
        self.gallery
            .render(frame, gallery_area, gallery_props(state, props.is_focused));

        let status = Span::styled(
            format!(" {} ", state.fetch.label()),
            Style::default()
                .fg(Color::from(border))
                .add_modifier(Modifier::BOLD),
        );
        let status_items = [StatusBarItem::span(status)];
        let hints = [
            StatusBarHint::new("↑↓", "browse"),
            StatusBarHint::new("enter", "select"),
            StatusBarHint::new("bksp", "clear"),
            StatusBarHint::new("pgdn", "scroll"),
            StatusBarHint::new("r", "retry"),
            StatusBarHint::new("q", "quit"),
        ];
        <StatusBar as Component<Action>>::render(
            &mut self.status_bar,
            frame,
            rows[1],
            StatusBarProps {
                left: StatusBarSection::hints(&hints).with_separator("  "),
                center: StatusBarSection::empty(),
                right: StatusBarSection::items(&status_items),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

fn container_block(border: Rgb) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::from(border)))
        .title(" Pokédex by type ")
}

fn picker_props(state: &AppState, is_focused: bool) -> TypePickerProps {
    TypePickerProps {
        picker_index: state.picker_index,
        selected: state.selected,
        accent: state.theme.border_rgb(),
        is_focused,
    }
}

fn gallery_props(state: &AppState, is_focused: bool) -> GalleryProps<'_> {
    GalleryProps {
        fetch: &state.fetch,
        images: &state.images,
        selected: state.selected,
        offset: state.gallery_offset,
        tick: state.tick,
        is_focused,
    }
}
