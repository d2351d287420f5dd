use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "smart-purge")]
#[command(about = "Find and purge unused content in a design database", long_about = None)]
pub struct Cli {
    /// Database file, overriding the configured path
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Which categories a command works on. With no flags, the default-selected ones.
#[derive(Debug, Args, Default)]
pub struct CategorySelector {
    /// Category id or glob pattern (e.g. "unreferenced_*"); repeatable
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Every category of a group; repeatable
    #[arg(short, long = "group")]
    pub groups: Vec<String>,

    /// Every category of every group
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a JSON element snapshot into the database
    Import { snapshot: PathBuf },
    /// List groups and categories
    List,
    /// Scan categories and report unused items
    Scan(CategorySelector),
    /// Scan, then delete the unused items (dry run unless --execute)
    Purge {
        #[command(flatten)]
        selector: CategorySelector,

        /// Actually delete; without it nothing is changed
        #[arg(long)]
        execute: bool,
    },
    /// Scan and export the unused items as CSV
    Export {
        #[command(flatten)]
        selector: CategorySelector,

        /// Output file (default PurgePreview_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print configuration values
    PrintConfig,
    /// Truncate all database tables
    TruncateDb,
}
