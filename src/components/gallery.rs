use std::collections::HashMap;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_dispatch::EventKind;

use super::Component;
use crate::action::Action;
use crate::aggregator::PokemonRecord;
use crate::color::Rgb;
use crate::sprite::{Sprite, SPRITE_PIXELS};
use crate::state::{gallery_columns, FetchState, ImageState, CARD_HEIGHT, CARD_WIDTH};
use crate::theme::{self, PLACEHOLDER_IMAGE_URL};
use crate::types::PokemonType;

const HALF_UPPER: &str = "▀";
const HALF_LOWER: &str = "▄";
const PLACEHOLDER_BG: Color = Color::Rgb(204, 204, 204);
const PLACEHOLDER_FG: Color = Color::Rgb(150, 150, 150);
const PLACEHOLDER_TEXT: &str = "Pokemon";
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TEXT_MAIN: Color = Color::Rgb(245, 245, 245);
const TEXT_DIM: Color = Color::Rgb(176, 176, 176);
const BADGE_TEXT: Color = Color::Rgb(16, 18, 20);
const ERROR_FG: Color = Color::Rgb(230, 57, 71);

pub struct GalleryProps<'a> {
    pub fetch: &'a FetchState,
    pub images: &'a HashMap<String, ImageState>,
    pub selected: Option<PokemonType>,
    /// First visible card row.
    pub offset: usize,
    pub tick: u64,
    pub is_focused: bool,
}

/// Card grid for the loaded records, or the current fetch status.
#[derive(Default)]
pub struct Gallery;

impl Component<Action> for Gallery {
    type Props<'a> = GalleryProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused || props.fetch.records().is_empty() {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::PageDown => Some(Action::GalleryScroll(1)),
                KeyCode::PageUp => Some(Action::GalleryScroll(-1)),
                _ => None,
            },
            EventKind::Scroll { delta, .. } => Some(Action::GalleryScroll(*delta as i16)),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        match props.fetch {
            FetchState::Idle => render_message(
                frame,
                area,
                "Select a type to browse Pokémon.",
                Style::default().fg(TEXT_DIM),
            ),
            FetchState::Loading => {
                let label = props
                    .selected
                    .map(|pokemon_type| pokemon_type.label())
                    .unwrap_or_else(|| "Pokémon".to_string());
                let frame_idx = (props.tick % SPINNER.len() as u64) as usize;
                let text = format!("{} Loading {label} Pokémon...", SPINNER[frame_idx]);
                render_message(frame, area, &text, Style::default().fg(TEXT_MAIN));
            }
            FetchState::Failed(message) => render_message(
                frame,
                area,
                message,
                Style::default().fg(ERROR_FG).add_modifier(Modifier::BOLD),
            ),
            FetchState::Success(records) if records.is_empty() => render_message(
                frame,
                area,
                "No Pokémon found for this type.",
                Style::default().fg(TEXT_DIM),
            ),
            FetchState::Success(records) => {
                render_grid(frame, area, records, props.images, props.offset)
            }
        }
    }
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    if area.height == 0 {
        return;
    }
    let top = area.y + area.height / 2;
    let line_area = Rect::new(area.x, top.min(area.bottom() - 1), area.width, 1);
    frame.render_widget(
        Paragraph::new(text.to_string())
            .style(style)
            .alignment(Alignment::Center),
        line_area,
    );
}

fn render_grid(
    frame: &mut Frame,
    area: Rect,
    records: &[PokemonRecord],
    images: &HashMap<String, ImageState>,
    offset: usize,
) {
    let columns = gallery_columns(area.width);
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let used_width = (columns as u16 * CARD_WIDTH).min(area.width);
    let left = area.x + (area.width - used_width) / 2;

    for (slot, record) in records
        .iter()
        .skip(offset * columns)
        .take(visible_rows * columns)
        .enumerate()
    {
        let row = (slot / columns) as u16;
        let col = (slot % columns) as u16;
        let card = Rect::new(
            left + col * CARD_WIDTH,
            area.y + row * CARD_HEIGHT,
            CARD_WIDTH.min(area.width),
            CARD_HEIGHT,
        )
        .intersection(area);
        if card.is_empty() {
            continue;
        }
        render_card(frame, card, record, artwork(record, images));
    }
}

fn render_card(frame: &mut Frame, area: Rect, record: &PokemonRecord, art: Artwork<'_>) {
    let (from, to, border) = record.card_gradient().rgb();
    fill_gradient(frame, area, from, to);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::from(border)))
        .title(Span::styled(
            format!(" {} ", display_name(&record.name)),
            Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.is_empty() {
        return;
    }

    let badges = Rect::new(inner.x, inner.y, inner.width, 1);
    frame.render_widget(Paragraph::new(badge_line(&record.types)), badges);

    let art_area = Rect::new(
        inner.x,
        inner.y + 1,
        inner.width,
        inner.height.saturating_sub(1),
    );
    match art {
        Artwork::Empty => {}
        Artwork::Sprite(sprite) => render_sprite(frame, art_area, sprite),
        Artwork::Placeholder => render_placeholder(frame, art_area),
    }
}

/// What a card shows under its badges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Artwork<'a> {
    /// No image, or one still loading.
    Empty,
    Sprite(&'a Sprite),
    /// The card's image failed and the placeholder artwork is not available.
    Placeholder,
}

pub fn artwork<'a>(
    record: &PokemonRecord,
    images: &'a HashMap<String, ImageState>,
) -> Artwork<'a> {
    let Some(url) = record.image_url.as_deref() else {
        return Artwork::Empty;
    };
    match images.get(url) {
        Some(ImageState::Ready(sprite)) => Artwork::Sprite(sprite),
        Some(ImageState::Failed) => match images.get(PLACEHOLDER_IMAGE_URL) {
            Some(ImageState::Ready(sprite)) => Artwork::Sprite(sprite),
            _ => Artwork::Placeholder,
        },
        Some(ImageState::Loading) | None => Artwork::Empty,
    }
}

/// Two pixels per cell: the upper half block takes the top pixel as its
/// foreground and the bottom pixel as its background. Transparent pixels keep
/// the card gradient.
fn render_sprite(frame: &mut Frame, area: Rect, sprite: &Sprite) {
    let cols = sprite.width.min(area.width);
    let rows = sprite.rows().min(area.height);
    let left = area.x + (area.width - cols) / 2;
    let top = area.y + (area.height - rows) / 2;

    let buffer = frame.buffer_mut();
    for row in 0..rows {
        for col in 0..cols {
            let upper = sprite.pixel(col, row * 2);
            let lower = sprite.pixel(col, row * 2 + 1);
            let Some(cell) = buffer.cell_mut((left + col, top + row)) else {
                continue;
            };
            match (upper, lower) {
                (Some(upper), Some(lower)) => {
                    cell.set_symbol(HALF_UPPER)
                        .set_fg(Color::from(upper))
                        .set_bg(Color::from(lower));
                }
                (Some(upper), None) => {
                    cell.set_symbol(HALF_UPPER).set_fg(Color::from(upper));
                }
                (None, Some(lower)) => {
                    cell.set_symbol(HALF_LOWER).set_fg(Color::from(lower));
                }
                (None, None) => {}
            }
        }
    }
}

/// Grey box with a caption, sized like a decoded sprite.
fn render_placeholder(frame: &mut Frame, area: Rect) {
    let size = SPRITE_PIXELS as u16;
    let width = size.min(area.width);
    let height = (size / 2).min(area.height);
    if width == 0 || height == 0 {
        return;
    }
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
    frame.render_widget(
        Block::default().style(Style::default().bg(PLACEHOLDER_BG)),
        rect,
    );
    let caption = Rect::new(rect.x, rect.y + height / 2, rect.width, 1);
    frame.render_widget(
        Paragraph::new(PLACEHOLDER_TEXT)
            .alignment(Alignment::Center)
            .style(Style::default().fg(PLACEHOLDER_FG).bg(PLACEHOLDER_BG)),
        caption,
    );
}

/// 135° linear gradient: top-left is `from`, bottom-right is `to`.
fn fill_gradient(frame: &mut Frame, area: Rect, from: Rgb, to: Rgb) {
    let span = f32::from(area.width.saturating_sub(1)) + f32::from(area.height.saturating_sub(1));
    let buffer = frame.buffer_mut();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let t = if span > 0.0 {
                (f32::from(x - area.x) + f32::from(y - area.y)) / span
            } else {
                0.0
            };
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_bg(Color::from(from.mix(to, t)));
            }
        }
    }
}

fn badge_line(types: &[String]) -> Line<'static> {
    let mut spans = Vec::with_capacity(types.len() * 2);
    for (idx, type_name) in types.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let bg = Rgb::parse(theme::badge_color(type_name)).unwrap_or_default();
        spans.push(Span::styled(
            format!(" {type_name} "),
            Style::default()
                .bg(Color::from(bg))
                .fg(BADGE_TEXT)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
