// src/config.rs
use crate::constants::{DEFAULT_LOG_FILE, LOG_PATH_ENV};
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Print the payload on a single line
    #[arg(long, global = true, default_value_t = false)]
    pub compact: bool,

    /// Write the payload to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a schema alteration payload for a fetched database
    Columns {
        /// Database object as returned by the Notion API
        #[arg(short, long)]
        database: String,

        /// Column edits: {"add": {name: column}, "rename": {old: new}, "remove": [names]}
        #[arg(short, long)]
        edits: Option<String>,
    },

    /// Render a property update payload for a fetched page
    Values {
        /// Database object the page belongs to
        #[arg(short, long)]
        database: String,

        /// Page object as returned by the Notion API
        #[arg(short, long)]
        page: String,

        /// Value edits: {name: value}
        #[arg(short, long)]
        edits: Option<String>,

        /// Replace the page title
        #[arg(long)]
        title: Option<String>,

        /// Render every updatable value, not only the edited ones
        #[arg(long, default_value_t = false)]
        all: bool,
    },
}

/// What a run should render, with every path resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Columns {
        database: PathBuf,
        edits: Option<PathBuf>,
    },
    Values {
        database: PathBuf,
        page: PathBuf,
        edits: Option<PathBuf>,
        title: Option<String>,
        all: bool,
    },
}

/// Resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub task: Task,
    pub verbose: bool,
    pub compact: bool,
    pub output_file: Option<PathBuf>,
    pub log_file: PathBuf,
}

fn existing_file(path: String, what: &str) -> Result<PathBuf, AppError> {
    let path = PathBuf::from(path);
    if path.is_file() {
        Ok(path)
    } else {
        Err(AppError::MissingConfiguration(format!(
            "{} file {} does not exist",
            what,
            path.display()
        )))
    }
}

impl RenderConfig {
    /// Resolves a run configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let task = match cli.command {
            Command::Columns { database, edits } => Task::Columns {
                database: existing_file(database, "database")?,
                edits: edits.map(|path| existing_file(path, "edits")).transpose()?,
            },
            Command::Values {
                database,
                page,
                edits,
                title,
                all,
            } => {
                if title.as_deref().is_some_and(|t| t.trim().is_empty()) {
                    return Err(AppError::MissingConfiguration(
                        "--title must not be empty".to_string(),
                    ));
                }
                Task::Values {
                    database: existing_file(database, "database")?,
                    page: existing_file(page, "page")?,
                    edits: edits.map(|path| existing_file(path, "edits")).transpose()?,
                    title,
                    all,
                }
            }
        };

        Ok(RenderConfig {
            task,
            verbose: cli.verbose,
            compact: cli.compact,
            output_file: cli.output.map(PathBuf::from),
            log_file: Self::log_file_path(),
        })
    }

    fn log_file_path() -> PathBuf {
        std::env::var_os(LOG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE))
    }
}
