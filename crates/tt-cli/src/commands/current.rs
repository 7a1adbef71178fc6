//! Current command for showing the running timer.

use std::io::Write;

use anyhow::Result;

use tt_core::ActivityStore;
use tt_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    match db.currently_tracked_activity()? {
        Some(activity) => writeln!(writer, "Currently tracking: {}", activity.name)?,
        None => writeln!(writer, "No activity is being tracked.")?,
    }
    Ok(())
}
