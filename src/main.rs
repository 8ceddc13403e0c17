use clap::Parser;
use tiki::cli::commands::Cli;
use tiki::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // No subcommand → launch TUI. It sets up its own file logging.
        None => handlers::start_dir(cli.project_dir.as_deref())
            .and_then(|start| tiki::tui::run(&start)),
        Some(_) => {
            tiki::logging::install_stderr();
            handlers::dispatch(cli)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
