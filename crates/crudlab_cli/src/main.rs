//! `crudlab` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, resolve configuration and logging, then hand off
//!   to one command.
//! - Report failures on stderr with exit status 1.

mod commands;

use clap::{Args, Parser, Subcommand};
use crudlab_core::model::book::{BookSearchField, BookSort};
use crudlab_core::model::member::MemberSort;
use crudlab_core::model::task::{TaskPriority, TaskStatus};
use crudlab_core::{init_logging, DbConfig, LogConfig, RowId, DEFAULT_LOAN_DAYS};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "crudlab")]
#[command(about = "Library, todo and inventory exercises on SQLite", long_about = None)]
struct Cli {
    /// Database file; overrides CRUDLAB_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// trace|debug|info|warn|error; overrides CRUDLAB_LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Directory for rotating log files; overrides CRUDLAB_LOG_DIR
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the schema (or recreate it with --force)
    Setup {
        /// Delete the existing database first
        #[arg(long)]
        force: bool,
    },
    /// Replace library data with the sample catalogue
    Seed,
    /// Add a book to the catalogue
    AddBook(AddBookArgs),
    /// List books
    ListBooks {
        /// Only books that are not checked out
        #[arg(long)]
        available: bool,
        /// title|author|created_at|published_year
        #[arg(long, default_value = "title")]
        sort: BookSort,
    },
    /// Search books by title or author
    SearchBooks {
        term: String,
        /// title|author
        #[arg(long, default_value = "title")]
        field: BookSearchField,
    },
    /// Delete a book without loan history
    DeleteBook { id: RowId },
    /// Register a library member
    AddMember {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// List members
    ListMembers {
        /// name|email|join_date
        #[arg(long, default_value = "name")]
        sort: MemberSort,
    },
    /// Lend a book to a member
    Borrow {
        book: RowId,
        member: RowId,
        #[arg(long, default_value_t = DEFAULT_LOAN_DAYS)]
        days: i64,
    },
    /// Return a borrowed book
    Return { loan: RowId },
    /// Show active loans, a member's history, or overdue loans
    Loans {
        /// Loans of one member, newest first
        #[arg(long, conflicts_with = "overdue")]
        member: Option<RowId>,
        /// Only active loans past their due date
        #[arg(long)]
        overdue: bool,
    },
    /// Add a task
    AddTask(AddTaskArgs),
    /// List tasks, newest first
    ListTasks {
        /// pending|in_progress|completed
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Change a task's status
    UpdateTask {
        id: RowId,
        #[arg(long)]
        status: TaskStatus,
    },
    /// Delete a task
    DeleteTask { id: RowId },
}

#[derive(Debug, Args)]
struct AddBookArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    isbn: String,
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Debug, Args)]
struct AddTaskArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: Option<String>,
    /// low|medium|high
    #[arg(long, default_value = "medium")]
    priority: TaskPriority,
    /// YYYY-MM-DD
    #[arg(long)]
    due: Option<NaiveDate>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(level) = cli.log_level.clone() {
        log_config.level = level;
    }
    if let Some(dir) = cli.log_dir.clone() {
        log_config.log_dir = Some(dir);
    }
    if let Err(err) = init_logging(&log_config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let db_config = match DbConfig::from_env() {
        Ok(mut config) => {
            if let Some(path) = cli.db.clone() {
                config.path = path;
            }
            config
        }
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(cli.command, db_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
