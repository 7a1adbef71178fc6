//! Update command for renaming activities or changing their description.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use tt_core::{ActivityStore, ActivityUpdate};
use tt_db::Database;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Activity name or alias.
    pub activity: String,
    /// New name.
    #[arg(short, long)]
    pub name: Option<String>,
    /// New description. An empty string clears it.
    #[arg(short, long = "desc")]
    pub description: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &UpdateArgs, db: &mut Database) -> Result<()> {
    let update = ActivityUpdate {
        name: args.name.clone(),
        description: args.description.clone(),
    };
    if update.is_noop() {
        bail!("nothing to update: pass --name and/or --desc");
    }

    let updated = db.update(&args.activity, &update)?;
    writeln!(writer, "Updated activity {}", updated.name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tt_core::Activity;

    #[test]
    fn update_renames_through_alias() {
        let mut db = Database::open_in_memory().unwrap();
        db.add(Activity::new("gym").with_alias("g")).unwrap();
        let mut output = Vec::new();

        let args = UpdateArgs {
            activity: "G".to_string(),
            name: Some("Fitness".to_string()),
            description: None,
        };
        run(&mut output, &args, &mut db).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Updated activity fitness\n"
        );
        assert_eq!(db.find("g").unwrap().name, "fitness");
    }

    #[test]
    fn update_without_changes_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        db.add(Activity::new("gym")).unwrap();
        let mut output = Vec::new();

        let args = UpdateArgs {
            activity: "gym".to_string(),
            name: None,
            description: None,
        };
        let err = run(&mut output, &args, &mut db).unwrap_err();
        assert!(err.to_string().contains("nothing to update"));
    }
}
