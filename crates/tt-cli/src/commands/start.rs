//! Start command for beginning a timer on an activity.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use tt_core::ActivityStore;
use tt_db::Database;

/// Arguments shared by `start` and `stop`.
#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Activity name or alias.
    pub activity: String,
}

pub fn run<W: Write>(writer: &mut W, args: &TrackArgs, db: &mut Database) -> Result<()> {
    let activity = db.find(&args.activity)?;
    db.start(&activity)?;
    writeln!(writer, "Started tracking {}", activity.name)?;
    Ok(())
}
