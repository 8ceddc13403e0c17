use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::project_io::{discover_project, load_project};
use crate::io::watcher::TaskWatcher;
use crate::model::{BoardConfig, Status, Task, UiConfig};
use crate::store::{ListenerId, StoreError, TaskSource, TaskStore};

use super::input;
use super::markdown::{MarkdownRenderer, renderer_for};
use super::render;
use super::theme::Theme;

/// Which view is currently displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Kanban columns
    Board,
    /// One task, full screen
    Detail { task_id: String },
}

/// One-line message shown in the status row until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct App {
    pub store: Arc<TaskStore>,
    pub board: BoardConfig,
    pub ui: UiConfig,
    pub theme: Theme,
    pub renderer: Box<dyn MarkdownRenderer>,
    pub view: View,
    pub should_quit: bool,
    /// Help overlay visible
    pub show_help: bool,
    /// Board snapshot, one entry per configured column
    pub columns: Vec<(Status, Vec<Task>)>,
    /// Selected column
    pub column: usize,
    /// Selected card per column
    pub rows: Vec<usize>,
    /// Task shown by the detail view (None when it no longer exists)
    pub detail_task: Option<Task>,
    pub detail_scroll: usize,
    pub message: Option<StatusMessage>,
    board_dirty: Arc<AtomicBool>,
    detail_dirty: Arc<AtomicBool>,
    board_listener: ListenerId,
    detail_listener: Option<ListenerId>,
}

impl App {
    pub fn new(store: Arc<TaskStore>, ui: UiConfig) -> Self {
        let board = store.board().clone();
        let board_dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&board_dirty);
        let board_listener = store.add_listener(move || flag.store(true, Ordering::SeqCst));

        let mut app = App {
            theme: Theme::from_config(&ui),
            renderer: renderer_for(ui.markdown),
            rows: vec![0; board.columns.len()],
            store,
            board,
            ui,
            view: View::Board,
            should_quit: false,
            show_help: false,
            columns: Vec::new(),
            column: 0,
            detail_task: None,
            detail_scroll: 0,
            message: None,
            board_dirty,
            detail_dirty: Arc::new(AtomicBool::new(false)),
            board_listener,
            detail_listener: None,
        };
        app.refresh_board();
        app
    }

    /// The read-only face of the store the views work against
    pub fn source(&self) -> &dyn TaskSource {
        self.store.as_ref()
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Re-read the board and clamp cursors to the new column sizes
    pub fn refresh_board(&mut self) {
        self.columns = self.source().group_by_status();
        self.rows.resize(self.columns.len(), 0);
        for (row, (_, tasks)) in self.rows.iter_mut().zip(&self.columns) {
            *row = (*row).min(tasks.len().saturating_sub(1));
        }
        self.column = self.column.min(self.columns.len().saturating_sub(1));
    }

    /// Re-read the task the detail view shows
    pub fn refresh_detail(&mut self) {
        let View::Detail { task_id } = &self.view else {
            return;
        };
        let result = self.source().get(task_id);
        self.detail_task = match result {
            Ok(task) => Some(task),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        };
    }

    /// Apply pending change notifications. Called once per event loop tick.
    pub fn sync(&mut self) {
        if self.board_dirty.swap(false, Ordering::SeqCst) {
            let selected = self.selected_task().map(|t| t.id.clone());
            self.refresh_board();
            if let Some(id) = selected {
                self.select_task(&id);
            }
        }
        if self.detail_dirty.swap(false, Ordering::SeqCst) {
            self.refresh_detail();
        }
    }

    // -----------------------------------------------------------------------
    // Board cursor
    // -----------------------------------------------------------------------

    pub fn selected_task(&self) -> Option<&Task> {
        let (_, tasks) = self.columns.get(self.column)?;
        tasks.get(self.rows.get(self.column).copied().unwrap_or(0))
    }

    /// Put the cursor on a task, wherever it now lives
    pub fn select_task(&mut self, id: &str) {
        for (col, (_, tasks)) in self.columns.iter().enumerate() {
            if let Some(row) = tasks.iter().position(|t| t.id == id) {
                self.column = col;
                self.rows[col] = row;
                return;
            }
        }
    }

    pub fn move_column(&mut self, delta: isize) {
        let last = self.columns.len().saturating_sub(1);
        self.column = self.column.saturating_add_signed(delta).min(last);
    }

    pub fn move_row(&mut self, delta: isize) {
        let Some((_, tasks)) = self.columns.get(self.column) else {
            return;
        };
        let last = tasks.len().saturating_sub(1);
        let row = &mut self.rows[self.column];
        *row = row.saturating_add_signed(delta).min(last);
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Move the selected task one column right (`forward`) or left
    pub fn shift_selected(&mut self, forward: bool) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let target = if forward {
            self.board.next_column(task.status)
        } else {
            self.board.prev_column(task.status)
        };
        let Some(target) = target else {
            return;
        };
        let id = task.id.clone();
        match self.store.move_task(&id, target) {
            Ok(moved) => {
                self.sync();
                self.select_task(&moved.id);
                let label = self.ui.status_label(target);
                self.set_info(format!("{} → {}", moved.id, label));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Re-read every task file
    pub fn reload(&mut self) {
        match self.store.reload() {
            Ok(()) => self.set_info(format!("reloaded {} tasks", self.store.len())),
            Err(e) if e.is_partial() => {
                let first = e.to_string();
                let summary = first.lines().next().unwrap_or_default().to_string();
                self.set_error(summary);
            }
            Err(e) => self.set_error(e.to_string()),
        }
        self.sync();
    }

    // -----------------------------------------------------------------------
    // Detail view
    // -----------------------------------------------------------------------

    /// Open the selected task and subscribe to store changes while it is shown
    pub fn enter_detail(&mut self) {
        let Some(task_id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        self.view = View::Detail { task_id };
        self.detail_scroll = 0;

        let flag = Arc::clone(&self.detail_dirty);
        let id = self
            .source()
            .add_listener(Box::new(move || flag.store(true, Ordering::SeqCst)));
        if let Some(old) = self.detail_listener.replace(id) {
            self.source().remove_listener(old);
        }
        self.refresh_detail();
    }

    /// Back to the board, dropping the detail subscription
    pub fn exit_detail(&mut self) {
        if let Some(id) = self.detail_listener.take() {
            self.source().remove_listener(id);
        }
        if let Some(task) = self.detail_task.take() {
            self.select_task(&task.id);
        }
        self.view = View::Board;
    }

    pub fn is_detail_subscribed(&self) -> bool {
        self.detail_listener.is_some()
    }

    // -----------------------------------------------------------------------
    // Status row
    // -----------------------------------------------------------------------

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(id) = self.detail_listener.take() {
            self.store.remove_listener(id);
        }
        self.store.remove_listener(self.board_listener);
    }
}

/// Run the TUI application for the project containing `start`
pub fn run(start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = discover_project(start)?;
    let project = load_project(&root)?;
    crate::logging::install_file(&project.tiki_dir)?;

    let store = Arc::new(TaskStore::open(&project.tasks_dir, &project.settings)?);
    let load = match project.settings.store.load_timeout_ms {
        Some(ms) => store.load_with_deadline(Duration::from_millis(ms)),
        None => store.load(),
    };
    let load_error = match load {
        Ok(()) => None,
        Err(e) if e.is_partial() => Some(e),
        Err(e) => return Err(e.into()),
    };

    let mut app = App::new(Arc::clone(&store), project.settings.ui.clone());
    if let Some(e) = load_error {
        let text = e.to_string();
        app.set_error(format!(
            "{} (see `tiki check`)",
            text.lines().next().unwrap_or_default()
        ));
    }

    let watcher = match TaskWatcher::start(store.root()) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "file watcher unavailable, press r to reload");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&TaskWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        // Our own writes show up here too; reloading is cheap and idempotent
        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            if let Err(e) = app.store.reload() {
                tracing::warn!(error = %e, "reload after file change");
            }
        }

        app.sync();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
