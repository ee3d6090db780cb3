use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

mod commands;
pub(crate) mod tui;

/// Fuzzy multi-select picker for the terminal.
#[derive(Parser)]
#[command(name = "multipick", version, about, long_about = None, disable_help_subcommand = true)]
struct Cli {
    /// Write logs to this file instead of stderr (filter with MULTIPICK_LOG).
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Pick items interactively from an options file.
    Pick {
        /// JSON options file: an array of {name, value} or {options, groupOptions}.
        file: PathBuf,

        /// Config file (defaults to ./multipick.toml if present).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format for the final selection.
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Start with these values selected.
        #[arg(long = "select", value_name = "VALUE")]
        preselect: Vec<String>,
    },

    /// Print the ranked matches for a query without the interactive UI.
    Search {
        /// JSON options file.
        file: PathBuf,

        /// Search text (joined with spaces).
        #[arg(required = true)]
        query: Vec<String>,

        /// Treat these values as already selected.
        #[arg(long, value_name = "VALUE")]
        exclude: Vec<String>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,

        /// Config file (defaults to ./multipick.toml if present).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,

        /// Automatically install completions into your shell config.
        #[arg(long)]
        install: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// JSON array of {name, value}.
    Json,
    /// One value per line.
    Lines,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = multipick::logging::init(cli.log_file.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    match cli.command {
        None => commands::help::run(),
        Some(Command::Pick {
            file,
            config,
            format,
            preselect,
        }) => commands::pick::run(&file, config.as_deref(), format, &preselect),
        Some(Command::Search {
            file,
            query,
            exclude,
            limit,
            config,
        }) => commands::search::run(&file, &query.join(" "), &exclude, limit, config.as_deref()),
        Some(Command::Completions { shell, install }) => {
            commands::completions::run(shell, install);
        }
    }
}
