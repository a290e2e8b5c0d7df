use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tasktracker::{Config, TaskStatus, TaskStore, display};
use tracing::{Level, debug};

#[derive(Parser)]
#[command(name = "tasktracker")]
#[command(about = "TaskTracker CLI - keep a personal task list in a local SQLite database")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a config file (default: per-user tasktracker.yml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the task database if it does not exist
    Init,

    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Optional longer description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show all tasks, newest first
    List {
        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a task as completed
    Complete { id: i64 },

    /// Mark a completed task as pending again
    Reopen { id: i64 },

    /// Change the title and/or description of a task
    Edit {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a task
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    // Setup tracing on stderr so command output stays clean
    let level = match cli.verbose {
        0 => config.log_level()?,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    if !config.color {
        colored::control::set_override(false);
    }

    // Open store
    let store = TaskStore::new(&config.db_path);
    store.initialize()?;
    debug!(path = ?store.db_path(), "Store initialized");

    let ok = run(&store, &config, cli.command)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Dispatch one command; `false` means the user got a warning instead
fn run(store: &TaskStore, config: &Config, command: Commands) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Task database ready at {}", store.db_path().display());
        }
        Commands::Add { title, description } => match store.create(title.trim(), description.trim())? {
            Some(id) => {
                println!("{} (id {})", "✓ Task added successfully!".green(), id);
                refresh(store)?;
            }
            None => return Ok(warn_user("Please enter a task title!")),
        },
        Commands::List { json } => {
            let tasks = store.list_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print_list(&tasks);
            }
        }
        Commands::Complete { id } => return change_status(store, id, TaskStatus::Completed),
        Commands::Reopen { id } => return change_status(store, id, TaskStatus::Pending),
        Commands::Edit { id, title, description } => {
            let Some(task) = store.get(id)? else {
                return Ok(warn_user("Task not found!"));
            };

            let title = title.unwrap_or(task.title);
            let description = description.or(task.description).unwrap_or_default();

            if !store.update_fields(id, title.trim(), description.trim())? {
                return Ok(warn_user("Title cannot be empty!"));
            }
            println!("{}", "✓ Task updated successfully!".green());
            refresh(store)?;
        }
        Commands::Delete { id, yes } => {
            let Some(task) = store.get(id)? else {
                return Ok(warn_user("Task not found!"));
            };

            if config.confirm_delete && !yes {
                let prompt = format!("Are you sure you want to delete:\n\"{}\"?", task.title);
                if !confirm(&prompt)? {
                    println!("Delete cancelled");
                    return Ok(true);
                }
            }

            store.delete(id)?;
            println!("{}", "✓ Task deleted successfully!".green());
            refresh(store)?;
        }
    }

    Ok(true)
}

fn change_status(store: &TaskStore, id: i64, status: TaskStatus) -> Result<bool> {
    if store.get(id)?.is_none() {
        return Ok(warn_user("Task not found!"));
    }

    store.set_status(id, status)?;
    match status {
        TaskStatus::Completed => println!("{}", "✓ Task marked as completed!".green()),
        TaskStatus::Pending => println!("{}", "✓ Task marked as pending!".green()),
    }
    refresh(store)?;
    Ok(true)
}

/// Re-read the store after a mutation and show the fresh list
fn refresh(store: &TaskStore) -> Result<()> {
    let tasks = store.list_all()?;
    println!();
    print_list(&tasks);
    Ok(())
}

fn print_list(tasks: &[tasktracker::Task]) {
    for line in display::render_list(tasks) {
        println!("{}", line);
    }
}

fn warn_user(message: &str) -> bool {
    eprintln!("{}", message.yellow().bold());
    false
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
