use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle,
};

use super::Component;
use crate::action::Action;
use crate::color::Rgb;
use crate::state::{picker_option, PICKER_LEN};
use crate::types::PokemonType;

pub const PLACEHOLDER_LABEL: &str = "Select a type";

const TEXT_MAIN: Color = Color::Rgb(232, 232, 232);
const TEXT_ON_ACCENT: Color = Color::Rgb(16, 18, 20);

pub struct TypePickerProps {
    /// Row under the cursor.
    pub picker_index: usize,
    /// Committed selection, marked in the list.
    pub selected: Option<PokemonType>,
    pub accent: Rgb,
    pub is_focused: bool,
}

/// Placeholder row plus one row per type. Moving only highlights; Enter commits.
pub struct TypePicker {
    list: SelectList,
}

impl Default for TypePicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePicker {
    pub fn new() -> Self {
        Self {
            list: SelectList::new(),
        }
    }
}

impl Component<Action> for TypePicker {
    type Props<'a> = TypePickerProps;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        if let EventKind::Key(key) = event {
            match key.code {
                KeyCode::Enter => return vec![Action::TypeSelect(picker_option(props.picker_index))],
                KeyCode::Backspace | KeyCode::Delete => return vec![Action::TypeSelect(None)],
                _ => {}
            }
        }

        let items = picker_items(props.selected);
        let list_props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: props.picker_index.min(PICKER_LEN - 1),
            is_focused: true,
            style: picker_style(props.accent),
            behavior: SelectListBehavior {
                show_scrollbar: false,
                wrap_navigation: true,
            },
            on_select: Action::PickerMove,
            render_item: &|item| item.clone(),
        };
        self.list.handle_event(event, list_props).into_iter().collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let accent = Color::from(props.accent);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Type ")
            .border_style(Style::default().fg(accent));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let items = picker_items(props.selected);
        let list_props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: props.picker_index.min(PICKER_LEN - 1),
            is_focused: props.is_focused,
            style: picker_style(props.accent),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: true,
            },
            on_select: Action::PickerMove,
            render_item: &|item| item.clone(),
        };
        self.list.render(frame, inner, list_props);
    }
}

fn picker_items(selected: Option<PokemonType>) -> Vec<Line<'static>> {
    let mut items = Vec::with_capacity(PICKER_LEN);
    items.push(Line::from(PLACEHOLDER_LABEL));
    items.extend(PokemonType::ALL.iter().map(|pokemon_type| {
        let marker = if selected == Some(*pokemon_type) {
            "● "
        } else {
            "  "
        };
        Line::from(format!("{marker}{}", pokemon_type.label()))
    }));
    items
}

fn picker_style(accent: Rgb) -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(Color::from(accent))
                    .fg(TEXT_ON_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::*;

    fn press(code: KeyCode) -> EventKind {
        EventKind::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn props(picker_index: usize) -> TypePickerProps {
        TypePickerProps {
            picker_index,
            selected: None,
            accent: Rgb::new(255, 222, 0),
            is_focused: true,
        }
    }

    #[test]
    fn enter_commits_highlighted_type() {
        let mut picker = TypePicker::new();
        let actions: Vec<_> = picker
            .handle_event(&press(KeyCode::Enter), props(2))
            .into_iter()
            .collect();
        actions.assert_count(1);
        actions.assert_first(Action::TypeSelect(Some(PokemonType::Fire)));
    }

    #[test]
    fn enter_on_placeholder_clears_selection() {
        let mut picker = TypePicker::new();
        let actions: Vec<_> = picker
            .handle_event(&press(KeyCode::Enter), props(0))
            .into_iter()
            .collect();
        actions.assert_first(Action::TypeSelect(None));
    }

    #[test]
    fn backspace_clears_selection() {
        let mut picker = TypePicker::new();
        let actions: Vec<_> = picker
            .handle_event(&press(KeyCode::Backspace), props(5))
            .into_iter()
            .collect();
        actions.assert_first(Action::TypeSelect(None));
    }

    #[test]
    fn unfocused_picker_ignores_keys() {
        let mut picker = TypePicker::new();
        let actions: Vec<_> = picker
            .handle_event(
                &press(KeyCode::Enter),
                TypePickerProps {
                    is_focused: false,
                    ..props(2)
                },
            )
            .into_iter()
            .collect();
        actions.assert_empty();
    }

    #[test]
    fn lists_placeholder_and_every_type() {
        let items = picker_items(Some(PokemonType::Water));
        assert_eq!(items.len(), 19);
        assert_eq!(items[0].to_string(), "Select a type");
        assert_eq!(items[3].to_string(), "● Water");
        assert_eq!(items[18].to_string(), "  Fairy");
    }

    #[test]
    fn renders_labels() {
        let mut render = RenderHarness::new(24, 24);
        let mut picker = TypePicker::new();
        let output = render.render_to_string_plain(|frame| {
            picker.render(frame, frame.area(), props(0));
        });
        assert!(output.contains("Select a type"));
        assert!(output.contains("Normal"));
        assert!(output.contains("Fairy"));
    }
}
