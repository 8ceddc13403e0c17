use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, View};

type Binding = (&'static str, &'static str);

const BOARD_BINDINGS: &[Binding] = &[
    ("\u{2190}\u{2192} h l", "Previous/next column"),
    ("\u{2191}\u{2193} j k", "Move cursor up/down"),
    ("g G", "First/last card"),
    ("> <", "Move task right/left"),
    ("Enter", "Open detail view"),
];

const DETAIL_BINDINGS: &[Binding] = &[
    ("\u{2191}\u{2193} j k", "Scroll"),
    ("g", "Back to top"),
    ("Esc h", "Back to board"),
];

const GLOBAL_BINDINGS: &[Binding] = &[
    ("r", "Reload task files"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

const KEY_COLUMN: usize = 12;

/// Key bindings for the current view, centered over `area`
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let header = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let key = Style::default()
        .fg(app.theme.accent)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc = Style::default().fg(app.theme.text).bg(bg);

    let (title, bindings) = match app.view {
        View::Board => ("Board", BOARD_BINDINGS),
        View::Detail { .. } => ("Detail", DETAIL_BINDINGS),
    };

    let mut lines: Vec<Line> = Vec::new();
    for (heading, section) in [(title, bindings), ("Global", GLOBAL_BINDINGS)] {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(format!(" {}", heading), header)));
        for (keys, what) in section {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<KEY_COLUMN$}", keys), key),
                Span::styled(*what, desc),
            ]));
        }
    }

    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 3;
    let popup = centered(area, width, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(" Keys ", header))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.muted).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// A `width` x `height` rectangle centered in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn test_board_help_lists_move_keys() {
        let (_tmp, app) = app_with_tasks(&[]);
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_help_overlay(frame, &app, area);
        });
        assert!(output.contains("Keys"));
        assert!(output.contains("Move task right/left"));
        assert!(output.contains("Reload task files"));
    }

    #[test]
    fn test_detail_help_is_contextual() {
        let (_tmp, mut app) = app_with_tasks(&[("A", Status::Backlog)]);
        app.enter_detail();
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_help_overlay(frame, &app, area);
        });
        assert!(output.contains("Back to board"));
        assert!(!output.contains("Move task right/left"));
    }

    #[test]
    fn test_centered_clips_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered(area, 50, 50), area);
    }
}
