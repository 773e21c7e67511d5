//! CLI parse: clap types for ExamWise. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ExamWise CLI - track exams, deadlines and preparation checklists
#[derive(Parser)]
#[command(name = "examwise")]
#[command(about = "Track upcoming exams and everything that leads up to them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Act as this user (overrides session.user from config)
    #[arg(long)]
    pub user: Option<String>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config/config.toml into the workspace
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Manage exams
    Exam {
        #[command(subcommand)]
        command: ExamCommands,
    },
    /// Manage the items on an exam card
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Follow live changes to the exam list or one exam's items
    Watch {
        /// Watch this exam's items instead of the exam list
        #[arg(long)]
        exam: Option<String>,
        /// Poll interval in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,
        /// Stop after this many polls (default: run until interrupted)
        #[arg(long)]
        count: Option<u64>,
    },
    /// Show session, store and exam summary
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ExamCommands {
    /// Add a new exam
    Add {
        /// Exam name (at least 2 characters)
        #[arg(long)]
        name: String,
        /// Exam date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        date: String,
        /// Optional subtitle, e.g. "Paper III"
        #[arg(long)]
        subtitle: Option<String>,
        /// Cover image URL (default from config)
        #[arg(long)]
        image_url: Option<String>,
    },
    /// List exams, upcoming first
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one exam and its items
    Show {
        exam_id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete an exam and all of its items
    Delete {
        exam_id: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item with default values
    Add {
        exam_id: String,
        /// Item type (see `examwise item types`)
        item_type: String,
    },
    /// Set one field of an item
    Set {
        exam_id: String,
        item_id: String,
        /// Field name (title, date, checked, status, label, url, description)
        field: String,
        value: String,
    },
    /// Flip a checklist item
    Toggle { exam_id: String, item_id: String },
    /// Delete an item
    Delete { exam_id: String, item_id: String },
    /// List the item types that can be added
    Types,
}
