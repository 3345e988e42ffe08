use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{centered_rect, theme_color};
use crate::app::App;
use crate::models::MAX_NAME_LEN;
use unicode_width::UnicodeWidthStr;

pub fn draw_rename_popup<B: Backend>(f: &mut Frame, app: &App) {
    let Some(form) = &app.rename_form else {
        return;
    };
    let accent = theme_color(&app.config.theme.accent, Color::Green);

    let area = centered_rect(50, 6, f.size());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Rename host ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(inner);

    let label = Paragraph::new(format!("Name (max {} characters)", MAX_NAME_LEN))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(label, rows[0]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(accent)),
        Span::raw(form.input.as_str()),
    ]));
    f.render_widget(input, rows[1]);

    if let Some(error) = &form.error {
        let error = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        f.render_widget(error, rows[2]);
    }

    let cursor_x = rows[1].x + 2 + form.input.width() as u16;
    if cursor_x < rows[1].right() {
        f.set_cursor(cursor_x, rows[1].y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{InputMode, RenameForm};
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, layout::Rect, Terminal};
    use std::path::PathBuf;

    #[tokio::test]
    async fn cursor_sits_after_wide_characters() {
        let config = AppConfig {
            server_url: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        };
        let mut app = App::new(config, PathBuf::from("zhost.toml")).unwrap();
        app.rename_form = Some(RenameForm {
            host_id: 1,
            input: "系统".to_string(),
            error: None,
        });
        app.input_mode = InputMode::Rename;

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| draw_rename_popup::<TestBackend>(f, &app))
            .unwrap();

        let area = centered_rect(50, 6, Rect::new(0, 0, 80, 24));
        let (x, y) = terminal.get_cursor().unwrap();
        assert_eq!(x, area.x + 1 + 2 + 4);
        assert_eq!(y, area.y + 2);
    }
}
