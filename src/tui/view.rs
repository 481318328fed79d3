use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use crate::grade::GradeLevel;

use super::form::{Focus, FormState, Outcome};
use super::markdown::render_summary;
use super::theme::Theme;

pub const TITLE: &str = "Lesson Summary Generator";
pub const SUBHEADER: &str = "Generate a concise summary of your lesson based on learning targets.";
pub const PENDING_MESSAGE: &str = "Generating lesson summary...";
pub const SUCCESS_MESSAGE: &str = "Lesson Summary Generated!";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAME_MS: u128 = 80;
const MAX_STATUS_ROWS: usize = 3;

pub fn render_form(frame: &mut Frame, state: &mut FormState, now: Instant) {
    let area = frame.area();
    let status = status_line(state.outcome(), now);
    let status_rows = wrapped_height(&line_text(&status), area.width.saturating_sub(2) as usize)
        .clamp(1, MAX_STATUS_ROWS) as u16;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(status_rows + 2),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(30)])
        .split(rows[1]);
    render_grades(frame, state, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Min(5)])
        .split(columns[1]);
    render_targets(frame, state, right[0]);
    render_summary_panel(frame, state, right[1]);

    render_status(frame, status, rows[2]);
    render_help(frame, rows[3]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(TITLE, Theme::title())),
        Line::from(Span::styled(SUBHEADER, Theme::muted())),
    ]);
    frame.render_widget(header, area);
}

fn render_grades(frame: &mut Frame, state: &FormState, area: Rect) {
    let items: Vec<ListItem> = GradeLevel::ALL
        .iter()
        .map(|grade| ListItem::new(grade.label()))
        .collect();

    let list = List::new(items)
        .block(Theme::panel(
            "Select a grade level:",
            state.focus == Focus::Grade,
        ))
        .highlight_style(Theme::selected())
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default().with_selected(Some(state.grade().index()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_targets(frame: &mut Frame, state: &mut FormState, area: Rect) {
    let focused = state.focus == Focus::Targets;
    let width = area.width.saturating_sub(2) as usize;
    let view_height = area.height.saturating_sub(2) as usize;
    state.editor.ensure_cursor_visible(view_height.max(1), width);

    let lines: Vec<Line> = state
        .editor
        .wrapped_lines(width)
        .into_iter()
        .map(Line::from)
        .collect();
    let editor = Paragraph::new(lines)
        .block(Theme::panel("Enter the learning targets for the lesson:", focused))
        .scroll((state.editor.scroll_top() as u16, 0));
    frame.render_widget(editor, area);

    if focused && width > 0 {
        let cursor = state.editor.visual_cursor(width);
        let visible_row = cursor.row.saturating_sub(state.editor.scroll_top());
        let x = area.x + 1 + cursor.col as u16;
        let y = area.y + 1 + (visible_row as u16).min(area.height.saturating_sub(3));
        frame.set_cursor_position((x, y));
    }
}

fn render_summary_panel(frame: &mut Frame, state: &mut FormState, area: Rect) {
    let body = match state.summary() {
        Some(summary) => render_summary(summary),
        None => Text::from(Line::from(Span::styled(
            "Your lesson summary will appear here.",
            Theme::muted(),
        ))),
    };

    let width = area.width.saturating_sub(2) as usize;
    let rows: usize = body
        .lines
        .iter()
        .map(|line| wrapped_height(&line_text(line), width))
        .sum();
    let max_scroll = rows.saturating_sub(area.height.saturating_sub(2) as usize);
    state.set_summary_max_scroll(max_scroll.min(u16::MAX as usize) as u16);

    let panel = Paragraph::new(body)
        .block(Theme::panel("Lesson Summary", state.focus == Focus::Summary))
        .wrap(Wrap { trim: false })
        .scroll((state.summary_scroll(), 0));
    frame.render_widget(panel, area);
}

fn render_status(frame: &mut Frame, status: Line<'static>, area: Rect) {
    let panel = Paragraph::new(status)
        .block(Theme::panel("Status", false))
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let keys = Line::from(vec![
        Theme::key_chip("Ctrl+G"),
        Theme::span(" Generate Summary"),
        Theme::bullet(),
        Theme::key_chip("Tab"),
        Theme::span(" next field"),
        Theme::bullet(),
        Theme::key_chip("Ctrl+L"),
        Theme::span(" clear"),
        Theme::bullet(),
        Theme::key_chip("Esc"),
        Theme::span(" exit"),
    ]);
    frame.render_widget(Paragraph::new(keys), area);
}

fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

/// Rows a line takes once word-wrapped at `width`. Never less than one.
fn wrapped_height(text: &str, width: usize) -> usize {
    if width == 0 {
        return 1;
    }

    let mut rows = 1;
    let mut used = 0;
    for word in text.split(' ') {
        let len = word.chars().count();
        let needed = if used == 0 { len } else { used + 1 + len };
        if needed <= width {
            used = needed;
        } else if len <= width {
            rows += 1;
            used = len;
        } else {
            rows += usize::from(used > 0) + (len - 1) / width;
            used = (len - 1) % width + 1;
        }
    }
    rows
}

pub fn status_line(outcome: &Outcome, now: Instant) -> Line<'static> {
    match outcome {
        Outcome::Idle => Line::from(Span::styled(
            "Pick a grade, enter learning targets, then generate.",
            Theme::muted(),
        )),
        Outcome::Pending { started } => {
            let elapsed = now.saturating_duration_since(*started).as_millis();
            let frame = SPINNER[(elapsed / SPINNER_FRAME_MS) as usize % SPINNER.len()];
            Line::from(vec![
                Span::styled(format!("{frame} "), Theme::label()),
                Span::raw(PENDING_MESSAGE),
            ])
        }
        Outcome::Summary(_) => Line::from(Span::styled(SUCCESS_MESSAGE, Theme::success())),
        Outcome::Warning(message) => Line::from(Span::styled(message.clone(), Theme::warning())),
        Outcome::Failed(message) => Line::from(Span::styled(message.clone(), Theme::danger())),
    }
}
