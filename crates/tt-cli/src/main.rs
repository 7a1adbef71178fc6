use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tt_cli::commands::{
    add, current, delete, init, list, purge, report, start, stop, update, wipe,
};
use tt_cli::{Cli, Commands, Config};

/// Open the database, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<tt_db::Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    tt_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut out = std::io::stdout().lock();
    match command {
        Commands::Init => init::run(&mut out, &config)?,
        Commands::Add(args) => add::run(&mut out, args, &mut open_database(&config)?)?,
        Commands::Update(args) => update::run(&mut out, args, &mut open_database(&config)?)?,
        Commands::Delete(args) => delete::run(&mut out, args, &mut open_database(&config)?)?,
        Commands::List => list::run(&mut out, &open_database(&config)?)?,
        Commands::Start(args) => start::run(&mut out, args, &mut open_database(&config)?)?,
        Commands::Stop(args) => stop::run(&mut out, args, &mut open_database(&config)?)?,
        Commands::Current => current::run(&mut out, &open_database(&config)?)?,
        Commands::Report(args) => report::run(&mut out, args, &open_database(&config)?, &config)?,
        Commands::Wipe(args) => wipe::run(&mut out, args, &mut open_database(&config)?)?,
        Commands::Purge(args) => purge::run(&mut out, args, &mut open_database(&config)?)?,
    }

    Ok(())
}
