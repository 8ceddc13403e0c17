use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, View};
use crate::util::unicode::{display_width, truncate_to_width};

const BOARD_HINTS: &str = "h/l column  j/k card  Enter open  >/< move  r reload  ? help  q quit";
const DETAIL_HINTS: &str = "Esc back  j/k scroll  r reload  ? help  q quit";

/// Render the status row (bottom of screen): the last message on the left,
/// key hints on the right when they fit
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans: Vec<Span> = Vec::new();
    if let Some(msg) = &app.message {
        let color = if msg.is_error {
            app.theme.danger
        } else {
            app.theme.success
        };
        spans.push(Span::styled(
            truncate_to_width(&format!(" {}", msg.text), width),
            Style::default().fg(color).bg(bg),
        ));
    }

    let hint = match app.view {
        View::Board => BOARD_HINTS,
        View::Detail { .. } => DETAIL_HINTS,
    };
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.muted).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
