use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Settings;
use crate::model::project::Project;

/// Name of the per-project directory
pub const TIKI_DIR: &str = ".tiki";

/// Config file inside `.tiki/`
pub const CONFIG_FILE: &str = "config.toml";

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a tiki project: no .tiki/ directory found")]
    NotAProject,
    #[error("already a tiki project: {} exists", .0.display())]
    AlreadyInitialized(PathBuf),
    #[error("could not read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("invalid config.toml: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the tiki project by walking up from the given directory,
/// looking for a `.tiki/` subdirectory.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(TIKI_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load the project rooted at `root`: settings plus resolved paths.
/// A missing config file means all defaults.
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let tiki_dir = root.join(TIKI_DIR);
    if !tiki_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }

    let settings = read_settings(&tiki_dir)?;
    let tasks_dir = tiki_dir.join(&settings.store.dir);

    Ok(Project {
        root: root.to_path_buf(),
        tiki_dir,
        tasks_dir,
        settings,
    })
}

/// Parse `.tiki/config.toml`, or return defaults when it does not exist
pub fn read_settings(tiki_dir: &Path) -> Result<Settings, ProjectError> {
    let config_path = tiki_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(Settings::default());
    }
    let text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let settings: Settings = toml::from_str(&text)?;
    settings.store.check().map_err(ProjectError::InvalidConfig)?;
    settings.board.check().map_err(ProjectError::InvalidConfig)?;
    Ok(settings)
}

const CONFIG_TEMPLATE: &str = r##"# tiki project settings. Every key is optional.

[store]
# Task files live in .tiki/<dir>/<ID>.md
dir = "tasks"
# New tasks are numbered <id_prefix>-001, <id_prefix>-002, ...
# The prefix is part of the file name: no path separators, no leading '.'.
id_prefix = "T"
# load_timeout_ms = 5000

[board]
# Columns, left to right. The statuses are fixed: pick any subset of
# Backlog, Todo, InProgress, Review, Done and order them. New names such as
# "Blocked" are rejected; rename a column for display under [ui.labels].
columns = ["Backlog", "Todo", "InProgress", "Review", "Done"]
# Any subset of Bug, Feature, Chore that keeps Chore, the type given to
# tasks that do not name one.
types = ["Bug", "Feature", "Chore"]

[ui]
# "text" strips markdown markup in the detail view, "plain" shows it verbatim
markdown = "text"

# [ui.labels]
# InProgress = "Doing"
#
# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# accent = "#FB4196"
"##;

/// Create `.tiki/`, its config file and the tasks directory under `root`
pub fn init_project(root: &Path, force: bool) -> Result<Project, ProjectError> {
    let tiki_dir = root.join(TIKI_DIR);
    let config_path = tiki_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(ProjectError::AlreadyInitialized(tiki_dir));
    }
    fs::create_dir_all(&tiki_dir)?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    let project = load_project(root)?;
    fs::create_dir_all(&project.tasks_dir)?;
    Ok(project)
}
