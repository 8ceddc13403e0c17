use std::path::PathBuf;

use super::config::Settings;

/// A discovered tiki project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of `.tiki/`)
    pub root: PathBuf,
    /// Path to the `.tiki/` directory
    pub tiki_dir: PathBuf,
    /// Directory holding one `<ID>.md` file per task
    pub tasks_dir: PathBuf,
    /// Parsed `.tiki/config.toml` (defaults when absent)
    pub settings: Settings,
}
