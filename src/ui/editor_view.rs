use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme_color;
use crate::app::{App, InputMode};
use crate::config::ThemeColors;
use crate::highlight::{Highlighter, Token, TokenKind};

pub fn draw_editor_panel<B: Backend>(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    draw_host_state(f, app, chunks[0]);
    draw_editor(f, app, chunks[1]);
}

/// Name of the selected entry with its enabled switch or read-only tag.
fn draw_host_state(f: &mut Frame, app: &App, area: Rect) {
    let current = app.store.current();
    let open_color = theme_color(&app.config.theme.open, Color::LightGreen);

    let mut spans = vec![Span::styled(
        current.name.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    if current.is_system() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            " read-only ",
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
    } else if current.open {
        spans.push(Span::styled("  [on] enabled", Style::default().fg(open_color)));
    } else {
        spans.push(Span::styled("  [off] enabled", Style::default().fg(Color::DarkGray)));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let is_editing = app.input_mode == InputMode::Editing;
    let accent = theme_color(&app.config.theme.accent, Color::Green);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_editing {
            Style::default().fg(accent)
        } else {
            Style::default()
        })
        .title(if app.editor.is_readonly() {
            " hosts (read-only) "
        } else {
            " hosts "
        });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = inner.height as usize;
    app.editor.scroll_into_view(height);
    let scroll = app.editor.scroll();
    let gutter_width = app.editor.lines().len().to_string().len().max(2);

    let tokens = Highlighter::new().document(&app.editor.text());
    let lines: Vec<Line> = app
        .editor
        .lines()
        .iter()
        .zip(&tokens)
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(number, (text, tokens))| {
            let mut spans = vec![Span::styled(
                format!("{:>width$} ", number + 1, width = gutter_width),
                Style::default().fg(Color::DarkGray),
            )];
            spans.extend(styled_spans(text, tokens, &app.config.theme));
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);

    if is_editing {
        let (row, _) = app.editor.cursor();
        let x = inner.x + (gutter_width + 1 + app.editor.cursor_width()) as u16;
        let y = inner.y + row.saturating_sub(scroll) as u16;
        if x < inner.right() && y < inner.bottom() {
            f.set_cursor(x, y);
        }
    }
}

fn styled_spans<'a>(text: &'a str, tokens: &[Token], theme: &ThemeColors) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for token in tokens {
        if token.range.start > last {
            spans.push(Span::raw(&text[last..token.range.start]));
        }
        let style = match token.kind {
            TokenKind::Comment => Style::default()
                .fg(theme_color(&theme.comment, Color::DarkGray))
                .add_modifier(Modifier::ITALIC),
            TokenKind::Ip => Style::default().fg(theme_color(&theme.ip, Color::Cyan)),
            TokenKind::Host => Style::default().fg(theme_color(&theme.host, Color::Yellow)),
            TokenKind::Plain => Style::default(),
        };
        last = token.range.end;
        spans.push(Span::styled(&text[token.range.clone()], style));
    }
    if last < text.len() {
        spans.push(Span::raw(&text[last..]));
    }
    spans
}
