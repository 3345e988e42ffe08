use ratatui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::app_event::NoticeLevel;

const NOTICE_TTL_SECS: u64 = 5;

pub fn draw_status_bar<B: Backend>(f: &mut Frame, app: &mut App, area: Rect) {
    let Some((notice, timestamp)) = &app.status_message else {
        return;
    };

    if timestamp.elapsed().as_secs() >= NOTICE_TTL_SECS {
        app.clear_status_message();
        return;
    }

    let style = match notice.level {
        NoticeLevel::Error => Style::default().fg(Color::Red),
        NoticeLevel::Info => Style::default().fg(Color::Yellow),
    };

    let paragraph = Paragraph::new(notice.message.as_str())
        .style(style)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}
