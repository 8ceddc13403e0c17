use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tiki", about = concat!("tiki v", env!("CARGO_PKG_VERSION"), " - a kanban board in plain markdown"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tiki project in the current directory
    Init(InitArgs),
    /// List tasks in board order
    List(ListArgs),
    /// Show task details
    Show(ShowArgs),
    /// Create a task
    Add(AddArgs),
    /// Move a task to another column
    Move(MoveArgs),
    /// Delete a task and its file
    Delete(DeleteArgs),
    /// Validate every task file
    Check,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing .tiki/config.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tasks in this column (e.g. todo, in-progress, Done)
    #[arg(long)]
    pub status: Option<String>,
    /// Only tasks carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Column to create the task in (default: first column)
    #[arg(long)]
    pub status: Option<String>,
    /// Bug, feature or chore
    #[arg(long = "type")]
    pub task_type: Option<String>,
    /// Low, medium, high or critical
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    /// Story points
    #[arg(long)]
    pub points: Option<u32>,
    /// Tag (repeatable)
    #[arg(long = "tag", action = clap::ArgAction::Append)]
    pub tags: Vec<String>,
    /// Markdown description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task ID
    pub id: String,
    /// Target column
    pub status: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task IDs to delete
    #[arg(required = true)]
    pub ids: Vec<String>,
}
