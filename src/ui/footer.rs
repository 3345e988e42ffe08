use crate::app::{App, InputMode};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_footer<B: Backend>(f: &mut Frame, app: &App, area: Rect) {
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (nav_text, action_text) = footer_hints(app);

    let nav_help = Paragraph::new(nav_text).style(Style::default().fg(Color::Gray));
    let action_help = Paragraph::new(action_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(ratatui::layout::Alignment::Right);

    f.render_widget(nav_help, footer[0]);
    f.render_widget(action_help, footer[1]);
}

fn footer_hints(app: &App) -> (&'static str, &'static str) {
    match app.input_mode {
        InputMode::Normal if app.store.is_system_selected() => (
            "↑/k: Up  ↓/j: Down  [Enter] View",
            "[a] Add [R] Reload [?] Help [q] Quit",
        ),
        InputMode::Normal => (
            "↑/k: Up  ↓/j: Down  [Enter] Edit",
            "[Space] Toggle [r] Rename [a] Add [?] Help [q] Quit",
        ),
        InputMode::Editing if app.editor.is_readonly() => ("Arrows: Move  PgUp/PgDn: Scroll", "[Esc] Back"),
        InputMode::Editing => ("Arrows: Move  Type to edit", "[Esc] Back"),
        InputMode::Rename => ("Type a new name", "[Enter] Save  [Esc] Cancel"),
    }
}
