//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    add::AddArgs, delete::DeleteArgs, purge::PurgeArgs, report::ReportArgs, start::TrackArgs,
    update::UpdateArgs, wipe::WipeArgs,
};

/// Personal activity time tracker.
///
/// Register activities, start and stop timers on them, and report how the
/// time was spent over a range of days.
#[derive(Debug, Parser)]
#[command(name = "tt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database if it does not exist yet.
    Init,

    /// Register a new activity.
    Add(AddArgs),

    /// Rename an activity or change its description.
    Update(UpdateArgs),

    /// Delete an activity.
    #[command(name = "del", visible_alias = "delete")]
    Delete(DeleteArgs),

    /// List all activities.
    #[command(visible_alias = "ls")]
    List,

    /// Start tracking an activity.
    Start(TrackArgs),

    /// Stop tracking an activity.
    Stop(TrackArgs),

    /// Show the activity currently being tracked.
    Current,

    /// Report time spent per activity over a period.
    Report(ReportArgs),

    /// Delete tracked time inside a period.
    Wipe(WipeArgs),

    /// Delete all activities and tracked time.
    Purge(PurgeArgs),
}
