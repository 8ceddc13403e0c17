use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Task;
use crate::parse::task_serializer::format_timestamp;
use crate::tui::app::App;
use crate::util::unicode::wrap_to_width;

const INDENT: &str = "  ";
const LABEL_WIDTH: usize = 10;

/// Render the detail view for a single task
pub fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let Some(task) = &app.detail_task else {
        let empty = Paragraph::new(" Task not found")
            .style(Style::default().fg(app.theme.muted).bg(bg));
        frame.render_widget(empty, area);
        return;
    };

    let lines = detail_lines(app, task, area.width as usize);

    // Do not scroll past the last line
    let max_scroll = lines.len().saturating_sub(area.height as usize);
    let scroll = app.detail_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(bg))
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

fn detail_lines(app: &App, task: &Task, width: usize) -> Vec<Line<'static>> {
    let bg = app.theme.background;
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let bright_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let dim_style = Style::default().fg(app.theme.muted).bg(bg);

    let mut lines: Vec<Line<'static>> = Vec::new();

    // Blank line at top for breathing room
    lines.push(Line::from(""));

    // Title
    lines.push(Line::from(vec![
        Span::styled(INDENT, text_style),
        Span::styled(format!("{}  ", task.id), dim_style),
        Span::styled(
            task.title.clone(),
            bright_style.add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));

    let field = |label: &str, value: Span<'static>| {
        Line::from(vec![
            Span::styled(format!("{}{:<w$}", INDENT, label, w = LABEL_WIDTH), dim_style),
            value,
        ])
    };

    lines.push(field(
        "status",
        Span::styled(
            app.ui.status_label(task.status),
            Style::default().fg(app.theme.status_color(task.status)).bg(bg),
        ),
    ));
    lines.push(field(
        "type",
        Span::styled(task.task_type.label(), text_style),
    ));
    lines.push(field(
        "priority",
        Span::styled(
            format!("{} {}", task.priority.marker(), task.priority),
            Style::default()
                .fg(app.theme.priority_color(task.priority))
                .bg(bg),
        ),
    ));
    if let Some(assignee) = &task.assignee {
        lines.push(field("assignee", Span::styled(assignee.clone(), text_style)));
    }
    if let Some(points) = task.points {
        lines.push(field("points", Span::styled(points.to_string(), text_style)));
    }
    if !task.tags.is_empty() {
        let tags = task
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(field(
            "tags",
            Span::styled(tags, Style::default().fg(app.theme.info).bg(bg)),
        ));
    }
    lines.push(field(
        "created",
        Span::styled(format_timestamp(&task.created_at), dim_style),
    ));
    lines.push(field(
        "updated",
        Span::styled(format_timestamp(&task.updated_at), dim_style),
    ));

    if task.description.is_empty() {
        return lines;
    }
    lines.push(Line::from(""));

    // A renderer failure falls back to the raw source with the error on top
    let body = match app.renderer.render(&task.description) {
        Ok(rendered) => rendered,
        Err(e) => {
            lines.push(Line::from(Span::styled(
                format!("{}({})", INDENT, e),
                Style::default().fg(app.theme.danger).bg(bg),
            )));
            task.description.clone()
        }
    };

    let wrap_width = width.saturating_sub(INDENT.len() * 2).max(1);
    for source_line in body.lines() {
        for row in wrap_to_width(source_line, wrap_width) {
            lines.push(Line::from(vec![
                Span::styled(INDENT, text_style),
                Span::styled(row, text_style),
            ]));
        }
    }

    lines
}
