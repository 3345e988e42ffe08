use ratatui::{
    backend::Backend,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation},
    Frame,
};

use crate::app::App;

pub fn render_help_popup<B: Backend>(f: &mut Frame, app: &mut App) {
    let block = Block::default()
        .title("Keyboard Shortcuts")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White));

    let area = centered_rect(70, 80, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let text = get_help_text();
    let line_count = text.lines.len();

    let inner_area = area.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    });

    let max_scroll = line_count.saturating_sub(inner_area.height as usize) as u16;
    if app.help_scroll_position > max_scroll {
        app.help_scroll_position = max_scroll;
    }

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .scroll((app.help_scroll_position, 0));
    f.render_widget(paragraph, inner_area);

    if line_count > inner_area.height as usize {
        let mut scrollbar_state = ratatui::widgets::ScrollbarState::new(line_count)
            .position(app.help_scroll_position as usize);

        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓")),
            inner_area,
            &mut scrollbar_state,
        );
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
    ))
}

fn binding<'a>(keys: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<11}", keys), Style::default().fg(Color::Green)),
        Span::raw(format!("- {}", action)),
    ])
}

fn get_help_text<'a>() -> Text<'a> {
    Text::from(vec![
        section("Host list"),
        binding("j, ↓", "Move down"),
        binding("k, ↑", "Move up"),
        binding("Enter, e", "Edit the selected entry"),
        binding("Space, o", "Enable or disable the entry"),
        binding("a", "Add a new entry"),
        binding("r", "Rename the entry"),
        binding("R, F5", "Reload system hosts"),
        binding("c", "Open the config file"),
        binding("q", "Quit"),
        Line::from(""),
        section("Editor"),
        binding("Esc", "Back to the host list"),
        binding("Arrows", "Move the cursor"),
        binding("PgUp, PgDn", "Scroll"),
        binding("Home, End", "Start or end of line"),
        Line::from(""),
        section("Rename"),
        binding("Enter", "Save the new name"),
        binding("Esc", "Cancel"),
        Line::from(""),
        section("Help Popup"),
        binding("?, Esc", "Toggle/Close help"),
        binding("↑, k", "Scroll up"),
        binding("↓, j", "Scroll down"),
    ])
}

/// helper function to create a centered rect using up certain percentage of the available rect `r`
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
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
