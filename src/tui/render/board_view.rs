use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::Task;
use crate::tui::app::App;
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Render one bordered column per configured status
pub fn render_board_view(frame: &mut Frame, app: &App, area: Rect) {
    if app.columns.is_empty() {
        return;
    }
    let n = app.columns.len() as u32;
    let constraints: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (idx, ((status, tasks), col_area)) in app.columns.iter().zip(areas.iter()).enumerate() {
        let is_current = idx == app.column;
        let bg = app.theme.background;
        let border_color = if is_current {
            app.theme.selection_border
        } else {
            app.theme.column_border
        };
        let title = format!(" {} ({}) ", app.ui.status_label(*status), tasks.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color).bg(bg))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(app.theme.status_color(*status))
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(bg));

        let inner = block.inner(*col_area);
        frame.render_widget(block, *col_area);

        let selected_row = is_current.then(|| app.rows.get(idx).copied().unwrap_or(0));
        let lines = card_lines(app, tasks, selected_row, inner.width as usize);

        // Keep the selected card on screen
        let height = inner.height as usize;
        let offset = match selected_row {
            Some(row) if height > 0 && row >= height => row + 1 - height,
            _ => 0,
        };
        let paragraph = Paragraph::new(lines)
            .style(Style::default().bg(bg))
            .scroll((offset as u16, 0));
        frame.render_widget(paragraph, inner);
    }
}

/// One line per card: priority marker, ID, title truncated to the column
fn card_lines(
    app: &App,
    tasks: &[Task],
    selected_row: Option<usize>,
    width: usize,
) -> Vec<Line<'static>> {
    let bg = app.theme.background;
    tasks
        .iter()
        .enumerate()
        .map(|(row, task)| {
            let selected = selected_row == Some(row);
            let row_bg = if selected { app.theme.selection_bg } else { bg };
            let marker = format!("{} ", task.priority.marker());
            let id = format!("{} ", task.id);
            let used = display_width(&marker) + display_width(&id);
            let title_width = width.saturating_sub(used);
            let title = pad_to_width(&truncate_to_width(&task.title, title_width), title_width);

            let title_style = if selected {
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text).bg(row_bg)
            };
            Line::from(vec![
                Span::styled(
                    marker,
                    Style::default()
                        .fg(app.theme.priority_color(task.priority))
                        .bg(row_bg),
                ),
                Span::styled(id, Style::default().fg(app.theme.muted).bg(row_bg)),
                Span::styled(title, title_style),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status, TaskDraft, UiConfig};
    use crate::tui::render::test_helpers::*;

    #[test]
    fn test_columns_and_cards() {
        let (_tmp, app) = app_with_tasks(&[
            ("Write docs", Status::Todo),
            ("Ship it", Status::Done),
        ]);
        let output = render_to_string(TERM_W, 10, |frame, area| {
            render_board_view(frame, &app, area);
        });
        let header = output.lines().next().unwrap();
        assert!(header.contains("Backlog (0)"));
        assert!(header.contains("Todo (1)"));
        assert!(header.contains("In Progress (0)"));
        assert!(header.contains("Done (1)"));
        assert!(output.contains("◇ T-001 Write docs"));
        assert!(output.contains("T-002 Ship it"));
    }

    #[test]
    fn test_configured_labels_replace_titles() {
        let mut ui = UiConfig::default();
        ui.labels.insert("InProgress".into(), "Doing".into());
        let (_tmp, app) = app_with_drafts(vec![], ui);
        let output = render_to_string(TERM_W, 5, |frame, area| {
            render_board_view(frame, &app, area);
        });
        assert!(output.contains("Doing (0)"));
        assert!(!output.contains("In Progress"));
    }

    #[test]
    fn test_long_titles_are_truncated() {
        let mut draft = TaskDraft::new(
            "An extremely long task title that cannot fit in a column",
            Status::Todo,
        );
        draft.priority = Some(Priority::Critical);
        let (_tmp, app) = app_with_drafts(vec![draft], UiConfig::default());
        let output = render_to_string(TERM_W, 6, |frame, area| {
            render_board_view(frame, &app, area);
        });
        assert!(output.contains("‼ T-001 An extrem"));
        assert!(output.contains('\u{2026}'));
        assert!(!output.contains("fit in a column"));
    }

    #[test]
    fn test_selected_card_scrolls_into_view() {
        let tasks: Vec<(String, Status)> =
            (0..10).map(|i| (format!("Card {}", i), Status::Backlog)).collect();
        let refs: Vec<(&str, Status)> = tasks.iter().map(|(t, s)| (t.as_str(), *s)).collect();
        let (_tmp, mut app) = app_with_tasks(&refs);
        app.rows[0] = 9;
        let output = render_to_string(TERM_W, 6, |frame, area| {
            render_board_view(frame, &app, area);
        });
        assert!(output.contains("Card 9"));
        assert!(!output.contains("Card 0"));
    }
}
