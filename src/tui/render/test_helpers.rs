use std::sync::Arc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::model::{Settings, Status, TaskDraft, UiConfig};
use crate::store::TaskStore;
use crate::tui::app::App;

pub const TERM_W: u16 = 100;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over a fresh temp store holding one task per `(title, status)`.
/// Keep the TempDir alive for as long as the App.
pub fn app_with_tasks(tasks: &[(&str, Status)]) -> (TempDir, App) {
    app_with_drafts(
        tasks
            .iter()
            .map(|(title, status)| TaskDraft::new(*title, *status))
            .collect(),
        UiConfig::default(),
    )
}

pub fn app_with_drafts(drafts: Vec<TaskDraft>, ui: UiConfig) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(TaskStore::open(tmp.path(), &Settings::default()).unwrap());
    for draft in drafts {
        store.create(draft).unwrap();
    }
    (tmp, App::new(store, ui))
}
