mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::project_io;
use crate::model::project::Project;
use crate::model::task::{Task, TaskDraft};
use crate::store::{PartialLoadError, StoreError, TaskStore};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.project_dir.as_deref())?;

    match cli.command {
        None => {
            eprintln!("no subcommand given (try `tiki --help`)");
            Ok(())
        }
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(args, &start),

            // Read commands
            Commands::List(args) => cmd_list(args, &start, json),
            Commands::Show(args) => cmd_show(args, &start, json),
            Commands::Check => cmd_check(&start, json),

            // Write commands
            Commands::Add(args) => cmd_add(args, &start, json),
            Commands::Move(args) => cmd_move(args, &start, json),
            Commands::Delete(args) => cmd_delete(args, &start),
        },
    }
}

/// Directory project discovery starts from: `-C <dir>` or the working directory
pub fn start_dir(project_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match project_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A discovered project with its store loaded
struct Loaded {
    project: Project,
    store: TaskStore,
    /// Files skipped during load, if any
    partial: Option<PartialLoadError>,
    /// Files left unread when the load deadline passed
    unread: usize,
}

/// Discover the project from `start`, open its store and load it.
/// Skipped files are kept for the caller; any other load error is fatal.
fn load_store(start: &Path) -> Result<Loaded, Box<dyn std::error::Error>> {
    let root = project_io::discover_project(start)?;
    let project = project_io::load_project(&root)?;
    let store = TaskStore::open(&project.tasks_dir, &project.settings)?;

    let result = match project.settings.store.load_timeout_ms {
        Some(ms) => store.load_with_deadline(Duration::from_millis(ms)),
        None => store.load(),
    };
    let (partial, unread) = match result {
        Ok(()) => (None, 0),
        Err(StoreError::PartialLoad(partial)) => (Some(partial), 0),
        Err(StoreError::LoadTimedOut {
            loaded,
            remaining,
            skipped,
        }) => {
            eprintln!(
                "warning: load deadline passed after {} files ({} not read)",
                loaded, remaining
            );
            let partial = (!skipped.failures.is_empty()).then_some(skipped);
            (partial, remaining)
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Loaded {
        project,
        store,
        partial,
        unread,
    })
}

fn print_task(task: &Task, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        for line in format_task_detail(task) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, start: &Path, json: bool) -> CmdResult {
    let Loaded { project, store, .. } = load_store(start)?;
    let status_filter = args.status.as_deref().map(parse_status).transpose()?;
    let tag_filter = args.tag.as_deref();

    let keep = |task: &Task| -> bool {
        if let Some(tf) = tag_filter
            && !task.tags.contains(tf)
        {
            return false;
        }
        true
    };

    let columns: Vec<_> = store
        .group_by_status()
        .into_iter()
        .filter(|(status, _)| status_filter.is_none_or(|sf| sf == *status))
        .map(|(status, tasks)| {
            let tasks: Vec<Task> = tasks.into_iter().filter(|t| keep(t)).collect();
            (status, tasks)
        })
        .collect();

    if json {
        let results: Vec<ColumnJson> = columns
            .iter()
            .map(|(status, tasks)| ColumnJson {
                status: *status,
                tasks: tasks.iter().map(task_to_json).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        let mut first = true;
        for (status, tasks) in &columns {
            if !first {
                println!();
            }
            first = false;
            let label = project.settings.ui.status_label(*status);
            println!("{}", format_column_header(&label, tasks.len()));
            for task in tasks {
                println!("{}", format_task_line(task));
            }
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, start: &Path, json: bool) -> CmdResult {
    let Loaded { store, .. } = load_store(start)?;
    let task = store.get(&args.id)?;
    print_task(&task, json)
}

fn cmd_check(start: &Path, json: bool) -> CmdResult {
    let Loaded {
        store,
        partial,
        unread,
        ..
    } = load_store(start)?;
    let result = check_to_json(store.len(), partial.as_ref(), unread);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if let Some(partial) = &partial {
            println!("{}", partial);
        }
        if result.valid {
            println!("✓ {} tasks, all files valid", result.loaded);
        } else if result.failures.is_empty() {
            println!(
                "✗ {} tasks loaded, {} files not checked before the deadline",
                result.loaded, result.unread
            );
        } else {
            println!("✗ {} tasks loaded, some files are invalid", result.loaded);
        }
    }

    if !result.failures.is_empty() {
        Err(format!("{} task files failed to load", result.failures.len()).into())
    } else if result.unread > 0 {
        Err(format!("{} task files were not checked", result.unread).into())
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, start: &Path, json: bool) -> CmdResult {
    let Loaded { store, .. } = load_store(start)?;

    let draft = TaskDraft {
        title: args.title,
        status: args.status.as_deref().map(parse_status).transpose()?,
        task_type: args.task_type.as_deref().map(parse_task_type).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        assignee: args.assignee,
        points: args.points,
        tags: args.tags.into_iter().collect(),
        description: args.description.unwrap_or_default(),
        ..Default::default()
    };

    let task = store.create(draft)?;
    if json {
        print_task(&task, true)
    } else {
        println!("{}", task.id);
        Ok(())
    }
}

fn cmd_move(args: MoveArgs, start: &Path, json: bool) -> CmdResult {
    let Loaded { store, .. } = load_store(start)?;
    let status = parse_status(&args.status)?;
    let task = store.move_task(&args.id, status)?;
    if json {
        print_task(&task, true)
    } else {
        println!("{} → {}", task.id, task.status);
        Ok(())
    }
}

fn cmd_delete(args: DeleteArgs, start: &Path) -> CmdResult {
    let Loaded { store, .. } = load_store(start)?;
    for id in &args.ids {
        let task = store.delete(id)?;
        println!("deleted {} {}", task.id, task.title);
    }
    Ok(())
}
