pub mod atomic;
pub mod project_io;
pub mod watcher;
