//! Add command for registering activities.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use tt_core::{Activity, ActivityStore};
use tt_db::Database;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Activity name: letters, digits, '_' or '-'.
    pub name: String,
    /// Short alternative name, unique across activities.
    #[arg(short, long)]
    pub alias: Option<String>,
    /// Free-form description.
    #[arg(short, long = "desc")]
    pub description: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &AddArgs, db: &mut Database) -> Result<()> {
    let mut activity = Activity::new(&args.name);
    if let Some(alias) = &args.alias {
        activity = activity.with_alias(alias);
    }
    if let Some(description) = &args.description {
        activity = activity.with_description(description);
    }

    let added = db.add(activity)?;
    writeln!(writer, "Added activity {}", added.name)?;
    Ok(())
}
