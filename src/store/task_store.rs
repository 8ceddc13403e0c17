use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::io::atomic::{AtomicFs, Persist};
use crate::io::watcher::is_task_file;
use crate::model::config::{BoardConfig, Settings};
use crate::model::fields::Status;
use crate::model::task::{InvalidField, Task, TaskDraft};
use crate::parse::task_parser::{decode_with_fallback, file_mtime};
use crate::parse::task_serializer::{encode, format_timestamp};

use super::error::{LoadFailure, PartialLoadError, StoreError};
use super::listeners::{ListenerId, ListenerRegistry};

/// File-backed, in-memory task collection.
///
/// Every task lives in `<root>/<ID>.md`. Reads are served from memory.
/// Mutations write the affected file atomically, then update the index,
/// then notify listeners; a failed write changes nothing and notifies no one.
///
/// All methods take `&self` and may be called from any thread.
pub struct TaskStore {
    root: PathBuf,
    board: BoardConfig,
    id_prefix: String,
    persist: Box<dyn Persist>,
    index: Mutex<Index>,
    listeners: ListenerRegistry,
}

#[derive(Default)]
struct Index {
    tasks: HashMap<String, Task>,
    /// Next number handed out by `create`. Never decreases.
    next_number: u64,
}

impl TaskStore {
    /// Open a store over `root`, creating the directory if needed.
    /// The store starts empty; call [`TaskStore::load`] to read existing files.
    pub fn open(root: impl AsRef<Path>, settings: &Settings) -> Result<Self, StoreError> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|e| StoreError::io(root, e))?;
        let root = root.canonicalize().map_err(|e| StoreError::io(root, e))?;
        Ok(TaskStore {
            root,
            board: settings.board.clone(),
            id_prefix: settings.store.id_prefix.clone(),
            persist: Box::new(AtomicFs),
            index: Mutex::new(Index {
                tasks: HashMap::new(),
                next_number: 1,
            }),
            listeners: ListenerRegistry::new(),
        })
    }

    /// Replace the filesystem backend
    pub fn with_persist(mut self, persist: impl Persist + 'static) -> Self {
        self.persist = Box::new(persist);
        self
    }

    /// Canonical tasks directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Read every task file under the root, replacing the in-memory index.
    ///
    /// Files are read in lexicographic order. A file that fails to decode or
    /// validate is skipped; so is a file whose ID was already seen. Skipped
    /// files are reported together as [`StoreError::PartialLoad`], after the
    /// good ones have been loaded.
    pub fn load(&self) -> Result<(), StoreError> {
        self.load_with(|| false)
    }

    /// Like [`TaskStore::load`], but stop reading once `timeout` has passed.
    /// Tasks read before the deadline stay loaded, and files that failed
    /// before it are reported in [`StoreError::LoadTimedOut`].
    pub fn load_with_deadline(&self, timeout: Duration) -> Result<(), StoreError> {
        let deadline = Instant::now() + timeout;
        self.load_with(|| Instant::now() >= deadline)
    }

    /// Load, then tell listeners. Used when files change underneath the store.
    pub fn reload(&self) -> Result<(), StoreError> {
        let result = self.load();
        self.listeners.notify();
        result
    }

    /// Load, checking `expired` before each file
    fn load_with(&self, mut expired: impl FnMut() -> bool) -> Result<(), StoreError> {
        let mut index = self.lock();
        let paths = self.task_files()?;

        let mut tasks: HashMap<String, Task> = HashMap::new();
        let mut failures = Vec::new();
        let mut highest = 0;
        let mut unread = None;

        for (i, path) in paths.iter().enumerate() {
            if expired() {
                unread = Some((i, paths.len() - i));
                break;
            }

            let task = match self.read_task(path) {
                Ok(task) => task,
                Err(error) => {
                    tracing::warn!(file = %path.display(), %error, "skipping task file");
                    failures.push(LoadFailure {
                        path: path.clone(),
                        error,
                    });
                    continue;
                }
            };

            if let Some(first) = tasks.get(&task.id) {
                let error = StoreError::DuplicateId {
                    id: task.id.clone(),
                    path: path.clone(),
                    first: first.source_path.clone().unwrap_or_default(),
                };
                tracing::warn!(file = %path.display(), %error, "skipping task file");
                failures.push(LoadFailure {
                    path: path.clone(),
                    error,
                });
                continue;
            }

            if let Some(n) = self.id_number(&task.id) {
                highest = highest.max(n);
            }
            tasks.insert(task.id.clone(), task);
        }

        tracing::info!(
            dir = %self.root.display(),
            loaded = tasks.len(),
            failed = failures.len(),
            "loaded tasks"
        );

        index.tasks = tasks;
        index.next_number = index.next_number.max(highest + 1);
        drop(index);

        let skipped = PartialLoadError { failures };
        if let Some((loaded, remaining)) = unread {
            return Err(StoreError::LoadTimedOut {
                loaded,
                remaining,
                skipped,
            });
        }
        if !skipped.failures.is_empty() {
            return Err(skipped.into());
        }
        Ok(())
    }

    /// Task files directly under the root, sorted by file name
    fn task_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let path = entry.path();
            if path.is_file() && is_task_file(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    fn read_task(&self, path: &Path) -> Result<Task, StoreError> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let fallback = file_mtime(path).unwrap_or_else(Utc::now);
        let task = decode_with_fallback(path, &content, fallback).map_err(|source| {
            StoreError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        task.validate(&self.board)?;

        let stem = path.file_stem().and_then(|s| s.to_str());
        if stem != Some(task.id.as_str()) {
            tracing::warn!(file = %path.display(), id = %task.id, "task id does not match file name");
        }
        Ok(task)
    }

    /// Numeric part of IDs shaped like `<prefix>-<digits>`
    fn id_number(&self, id: &str) -> Option<u64> {
        id.strip_prefix(self.id_prefix.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Snapshot of all tasks, ordered by board column, then priority
    /// (highest first), then creation time (oldest first)
    pub fn list(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.lock().tasks.values().cloned().collect();
        self.sort_tasks(&mut tasks);
        tasks
    }

    /// Copy of one task
    pub fn get(&self, id: &str) -> Result<Task, StoreError> {
        self.lock()
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Tasks bucketed by board column, in column order. Every configured
    /// column appears, empty or not.
    pub fn group_by_status(&self) -> Vec<(Status, Vec<Task>)> {
        let mut groups: Vec<(Status, Vec<Task>)> = self
            .board
            .columns
            .iter()
            .map(|status| (*status, Vec::new()))
            .collect();
        for task in self.list() {
            if let Some(idx) = self.board.column_index(task.status) {
                groups[idx].1.push(task);
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sort_tasks(&self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| {
            let key = |t: &Task| {
                (
                    self.board.column_index(t.status).unwrap_or(usize::MAX),
                    Reverse(t.priority),
                    t.created_at,
                )
            };
            key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
        });
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a task from a draft under a fresh ID and write it to disk.
    ///
    /// The ID is taken from the counter before the draft is validated, so a
    /// rejected draft still uses up its number.
    pub fn create(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        let now = Utc::now();
        let mut index = self.lock();

        let id = loop {
            let candidate = format!("{}-{:03}", self.id_prefix, index.next_number);
            index.next_number += 1;
            if !index.tasks.contains_key(&candidate) && !self.path_for(&candidate).exists() {
                break candidate;
            }
        };

        let mut task = draft.into_task(id, &self.board, now);
        task.description = normalize_body(&task.description);
        task.validate(&self.board)?;

        let path = self.backing_path(&task)?;
        self.persist
            .write_atomic(&path, encode(&task).as_bytes())
            .map_err(|e| StoreError::io(&path, e))?;
        task.source_path = Some(path);

        index.tasks.insert(task.id.clone(), task.clone());
        drop(index);

        tracing::debug!(id = %task.id, "created task");
        self.listeners.notify();
        Ok(task)
    }

    /// Apply `mutator` to a copy of the task, validate, persist and swap it in.
    ///
    /// The mutator runs with the store locked and must not call back into
    /// the store. It may not change `id` or `created_at`; `updated_at` and
    /// `source_path` are managed by the store.
    pub fn update<F>(&self, id: &str, mutator: F) -> Result<Task, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let mut index = self.lock();
        let current = index
            .tasks
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut next = current.clone();
        mutator(&mut next);

        if next.id != current.id {
            return Err(InvalidField::new("id", next.id).into());
        }
        if next.created_at != current.created_at {
            return Err(InvalidField::new("created_at", format_timestamp(&next.created_at)).into());
        }
        next.source_path = current.source_path.clone();
        next.description = normalize_body(&next.description);
        next.updated_at = Utc::now().max(next.created_at);
        next.validate(&self.board)?;

        let path = self.backing_path(&next)?;
        self.persist
            .write_atomic(&path, encode(&next).as_bytes())
            .map_err(|e| StoreError::io(&path, e))?;

        index.tasks.insert(next.id.clone(), next.clone());
        drop(index);

        tracing::debug!(id = %next.id, "updated task");
        self.listeners.notify();
        Ok(next)
    }

    /// Change only the status
    pub fn move_task(&self, id: &str, status: Status) -> Result<Task, StoreError> {
        self.update(id, |task| task.status = status)
    }

    /// Remove a task and its file. A file already gone from disk is not an error.
    pub fn delete(&self, id: &str) -> Result<Task, StoreError> {
        let mut index = self.lock();
        let task = index
            .tasks
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let path = self.backing_path(task)?;
        match self.persist.remove(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(&path, e)),
        }

        let removed = index.tasks.remove(id);
        drop(index);

        tracing::debug!(id, "deleted task");
        self.listeners.notify();
        removed.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    /// Register a callback run after every successful mutation and reload
    pub fn add_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add_listener(callback)
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove_listener(id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.md", id))
    }

    /// The file a task is written to: where it was loaded from, or
    /// `<root>/<ID>.md` for a new task. Must lie directly inside the root.
    fn backing_path(&self, task: &Task) -> Result<PathBuf, StoreError> {
        let path = match &task.source_path {
            Some(path) => path.clone(),
            None => self.path_for(&task.id),
        };
        if path.parent() != Some(self.root.as_path()) {
            return Err(InvalidField::new("source_path", path.display().to_string()).into());
        }
        Ok(path)
    }

    fn lock(&self) -> MutexGuard<'_, Index> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Descriptions are stored the way a reload would read them back: the
/// document is trimmed on decode, so trailing whitespace never survives.
fn normalize_body(body: &str) -> String {
    body.trim_end().to_string()
}
