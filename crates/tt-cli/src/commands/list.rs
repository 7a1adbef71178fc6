//! List command for printing all activities.

use std::io::Write;

use anyhow::Result;

use tt_core::ActivityStore;
use tt_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let activities = db.list()?;
    if activities.is_empty() {
        writeln!(writer, "No activities found.")?;
        return Ok(());
    }

    for activity in activities {
        writeln!(writer, "{activity}")?;
    }
    Ok(())
}
