use ratatui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::theme_color;
use crate::app::{App, InputMode};

pub fn draw_hosts_list<B: Backend>(f: &mut Frame, app: &mut App, area: Rect) {
    let is_active = app.input_mode == InputMode::Normal;
    let accent = theme_color(&app.config.theme.accent, Color::Green);
    let open_color = theme_color(&app.config.theme.open, Color::LightGreen);
    let selection = app.store.selection();

    let items: Vec<ListItem> = app
        .store
        .hosts()
        .iter()
        .map(|host| {
            let is_selected = host.id == selection;
            let prefix = if is_selected { "> " } else { "  " };

            let text_style = if is_selected && is_active {
                Style::default()
                    .fg(Color::Black)
                    .bg(accent)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else if host.is_system() {
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = vec![
                Span::styled(prefix, text_style),
                Span::styled(host.name.clone(), text_style),
            ];
            if host.open {
                spans.push(Span::styled(" ●", Style::default().fg(open_color)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let border_style = if is_active {
        Style::default().fg(accent)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Zhost "),
    );

    f.render_stateful_widget(list, area, &mut app.host_list_state);
}
