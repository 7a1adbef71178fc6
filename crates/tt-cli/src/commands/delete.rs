//! Delete command for removing activities.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use tt_core::ActivityStore;
use tt_db::Database;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Activity name or alias.
    pub activity: String,
}

pub fn run<W: Write>(writer: &mut W, args: &DeleteArgs, db: &mut Database) -> Result<()> {
    let activity = db.find(&args.activity)?;
    db.delete(&activity.name)?;
    writeln!(writer, "Deleted activity {}", activity.name)?;
    Ok(())
}
