pub mod editor_view;
pub mod footer;
pub mod help_popup;
pub mod hosts_list;
pub mod rename_popup;
pub mod status_bar;

use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    Frame,
};

use crate::app::App;

pub fn draw<B: Backend>(f: &mut Frame, app: &mut App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(3),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Footer
            ]
            .as_ref(),
        )
        .split(size);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)].as_ref())
        .split(chunks[0]);

    hosts_list::draw_hosts_list::<B>(f, app, main[0]);
    editor_view::draw_editor_panel::<B>(f, app, main[1]);
    status_bar::draw_status_bar::<B>(f, app, chunks[1]);
    footer::draw_footer::<B>(f, app, chunks[2]);

    if app.rename_form.is_some() {
        rename_popup::draw_rename_popup::<B>(f, app);
    }
    if app.show_help {
        help_popup::render_help_popup::<B>(f, app);
    }
}

/// Theme colours come from the config file as names or `#rrggbb`.
pub fn theme_color(value: &str, fallback: Color) -> Color {
    value.parse().unwrap_or(fallback)
}

/// Helper to center a rectangle with a fixed height.
pub fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height)) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
