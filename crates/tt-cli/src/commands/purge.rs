//! Purge command for deleting everything.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use tt_db::Database;

#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Confirm the deletion.
    #[arg(long)]
    pub yes: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &PurgeArgs, db: &mut Database) -> Result<()> {
    if !args.yes {
        bail!("refusing to delete all activities and logs without --yes");
    }
    db.purge()?;
    writeln!(writer, "Deleted all activities and logs")?;
    Ok(())
}
