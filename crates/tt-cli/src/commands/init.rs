//! Init command for creating the database.

use std::io::Write;

use anyhow::{Context, Result};

use tt_db::Database;

use crate::Config;

/// Creates the database file and its parent directory.
///
/// Opening the database is idempotent, so running `init` twice is harmless.
pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    writeln!(writer, "Database: {}", config.database_path.display())?;
    Ok(())
}
