use crate::palette::Palette;

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

/// Shared styles so every panel of the form looks the same.
pub struct Theme;

impl Theme {
    pub const KEY_FG: Color = Color::Rgb(255, 255, 255);

    pub fn label() -> Style {
        Palette::ACCENT.fg().add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Palette::INFO.fg().add_modifier(Modifier::BOLD)
    }

    pub fn muted() -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }

    pub fn success() -> Style {
        Palette::SUCCESS.fg().add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Palette::WARNING.fg().add_modifier(Modifier::BOLD)
    }

    pub fn danger() -> Style {
        Palette::DANGER.fg().add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Palette::ACCENT
            .bg()
            .fg(Self::KEY_FG)
            .add_modifier(Modifier::BOLD)
    }

    /// A rounded panel; the border lights up when the panel has focus.
    pub fn panel<'a>(title: impl Into<String>, focused: bool) -> Block<'a> {
        let border = if focused {
            Palette::ACCENT.fg()
        } else {
            Palette::BORDER.fg()
        };

        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Self::title_line(title))
            .title_alignment(Alignment::Left)
    }

    pub fn title_line(title: impl Into<String>) -> Line<'static> {
        Line::from(vec![Span::styled(
            format!(" {} ", title.into()),
            Self::label(),
        )])
    }

    pub fn span(text: impl Into<String>) -> Span<'static> {
        Span::raw(text.into())
    }

    pub fn key_chip(text: impl Into<String>) -> Span<'static> {
        Span::styled(format!(" {} ", text.into()), Self::selected())
    }

    pub fn bullet() -> Span<'static> {
        Self::span(" • ")
    }
}
