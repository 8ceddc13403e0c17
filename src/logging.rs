use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Log file inside `.tiki/` used while the TUI owns the terminal
pub const LOG_FILE: &str = "tiki.log";

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Log to stderr. `RUST_LOG` overrides the default `warn` level.
pub fn install_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

/// Log to `<tiki_dir>/tiki.log` so output never lands on the alternate screen.
pub fn install_file(tiki_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(tiki_dir)?;
    let file = open_log(&tiki_dir.join(LOG_FILE))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
