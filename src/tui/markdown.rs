use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Renders the model's Markdown answer into styled lines for the summary panel.
pub fn render_summary(md: &str) -> Text<'static> {
    let mut out = SummaryLines::default();
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new_ext(md, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    out.flush();
                    out.push_style(heading_style(level));
                }
                Tag::Strong => out.push_style(out.style().add_modifier(Modifier::BOLD)),
                Tag::Emphasis => out.push_style(out.style().add_modifier(Modifier::ITALIC)),
                Tag::Strikethrough => {
                    out.push_style(out.style().add_modifier(Modifier::CROSSED_OUT))
                }
                Tag::BlockQuote(_) => out.push_style(out.style().add_modifier(Modifier::DIM)),
                Tag::CodeBlock(_) => {
                    out.flush();
                    in_code_block = true;
                    out.push_style(Style::default().add_modifier(Modifier::DIM));
                }
                Tag::List(start) => lists.push(start),
                Tag::Item => {
                    out.flush();
                    let depth = lists.len().saturating_sub(1);
                    let marker = match lists.last_mut() {
                        Some(Some(n)) => {
                            let marker = format!("{n}. ");
                            *n += 1;
                            marker
                        }
                        _ => "• ".to_string(),
                    };
                    out.prefix = Some(format!("{}{marker}", "  ".repeat(depth)));
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Paragraph => {
                    out.flush();
                    if lists.is_empty() {
                        out.blank();
                    }
                }
                TagEnd::Heading(_) => {
                    out.flush();
                    out.blank();
                    out.pop_style();
                }
                TagEnd::Strong
                | TagEnd::Emphasis
                | TagEnd::Strikethrough
                | TagEnd::BlockQuote(_) => out.pop_style(),
                TagEnd::List(_) => {
                    out.flush();
                    lists.pop();
                    if lists.is_empty() {
                        out.blank();
                    }
                }
                TagEnd::CodeBlock => {
                    out.flush();
                    out.blank();
                    out.pop_style();
                    in_code_block = false;
                }
                TagEnd::Item => out.flush(),
                _ => {}
            },
            Event::Text(text) if in_code_block => {
                for (idx, segment) in text.split('\n').enumerate() {
                    if idx > 0 {
                        out.flush();
                    }
                    if !segment.is_empty() {
                        out.push(segment.to_string());
                    }
                }
            }
            Event::Text(text) => out.push(text.to_string()),
            Event::Code(code) => {
                let style = Style::default().add_modifier(Modifier::REVERSED);
                out.push_styled(code.to_string(), style);
            }
            Event::SoftBreak => out.push(" ".to_string()),
            Event::HardBreak => out.flush(),
            Event::Rule => {
                out.flush();
                let rule = Span::styled("─".repeat(20), Style::default().add_modifier(Modifier::DIM));
                out.lines.push(Line::from(rule));
                out.blank();
            }
            _ => {}
        }
    }

    out.flush();
    while out.lines.last().is_some_and(|line| line.spans.is_empty()) {
        out.lines.pop();
    }
    Text::from(out.lines)
}

#[derive(Default)]
struct SummaryLines {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    prefix: Option<String>,
}

impl SummaryLines {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, style: Style) {
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn push(&mut self, text: String) {
        let style = self.style();
        self.push_styled(text, style);
    }

    fn push_styled(&mut self, text: String, style: Style) {
        if self.current.is_empty()
            && let Some(prefix) = self.prefix.take()
        {
            self.current.push(Span::raw(prefix));
        }
        self.current.push(Span::styled(text, style));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank(&mut self) {
        self.lines.push(Line::default());
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 => style.add_modifier(Modifier::UNDERLINED),
        _ => style,
    }
}
