//! CLI subcommand implementations.

pub mod add;
pub mod current;
pub mod delete;
pub mod init;
pub mod list;
pub mod purge;
pub mod report;
pub mod start;
pub mod stop;
pub mod update;
pub mod wipe;
