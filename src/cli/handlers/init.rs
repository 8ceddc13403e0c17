use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::project_io;

/// Create `.tiki/` in `dir` (the `-C` directory or the current one)
pub fn cmd_init(args: InitArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_io::init_project(dir, args.force)?;
    println!(
        "Initialized tiki project in {}",
        project.tiki_dir.display()
    );
    println!("  tasks: {}", project.tasks_dir.display());
    Ok(())
}
