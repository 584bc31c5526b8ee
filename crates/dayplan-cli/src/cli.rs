use clap::{Args, Parser, Subcommand};
use dayplan_core::{
    projection::SectionKind,
    tasks::{Priority, TaskDate, TimeOfDay},
};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "dayplan",
    about = "Day-by-day task planner with priorities and a meditation timer",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch the interactive day view (press q to exit).
    Tui {
        /// Day to open (DD/MM/YYYY, today, tomorrow, yesterday).
        #[arg(long, value_parser = parse_day)]
        date: Option<TaskDate>,
    },
    /// Print version and exit.
    Version,
    /// Check that the task store can be written and read back.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// List, edit and copy tasks.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Run a meditation countdown (Ctrl-C stops it).
    Timer {
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long)]
        seconds: Option<u32>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Show a day's sections and progress.
    List {
        #[arg(long, value_parser = parse_day)]
        date: Option<TaskDate>,
    },
    /// Create a task.
    Add {
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Change fields of an existing task; unset flags keep their value.
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Drop the time range.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        no_time: bool,
    },
    /// Move a task to a section: high, medium, low or completed.
    Move { id: u64, section: SectionKind },
    /// Toggle completion, keeping the priority.
    Done { id: u64 },
    /// Delete a task.
    Delete { id: u64 },
    /// List previously used titles (candidates for `copy`).
    Titles,
    /// Copy the first task with this title onto a day.
    Copy {
        #[arg(long)]
        title: String,
        /// Target day (defaults to today).
        #[arg(long, value_parser = parse_day)]
        to: Option<TaskDate>,
    },
    /// Copy every task of `source` onto a day.
    CopyDay {
        #[arg(value_parser = parse_day)]
        source: TaskDate,
        #[arg(long, value_parser = parse_day)]
        to: Option<TaskDate>,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_day)]
    pub date: Option<TaskDate>,
    #[arg(short, long)]
    pub priority: Option<Priority>,
    /// Start time, HH:MM.
    #[arg(long)]
    pub from: Option<TimeOfDay>,
    /// End time, HH:MM (requires --from).
    #[arg(long)]
    pub to: Option<TimeOfDay>,
}

/// `DD/MM/YYYY` or one of `today`, `tomorrow`, `yesterday`.
pub fn parse_day(raw: &str) -> Result<TaskDate, String> {
    let today = TaskDate::today();
    match raw.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today.succ()),
        "yesterday" => Ok(today.pred()),
        other => other.parse().map_err(|e: dayplan_core::tasks::ParseError| e.to_string()),
    }
}
