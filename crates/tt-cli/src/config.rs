//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Directory CSV and JSON reports are written to.
    pub report_dir: PathBuf,
    /// Default duration format code (`a`, `s`, `m` or `h`).
    pub duration_format: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("tt.db"),
            report_dir: PathBuf::from("."),
            duration_format: "a".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default locations, then `config_path`
    /// if given, then `TT_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // TT_DATABASE_PATH, TT_REPORT_DIR, TT_DURATION_FORMAT
        figment = figment.merge(Env::prefixed("TT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for tt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tt"))
}

/// Returns the platform-specific data directory for tt.
///
/// On Linux: `~/.local/share/tt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirs_data_path_ends_with_tt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tt");
    }

    #[test]
    fn default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("tt.db"));
        assert_eq!(config.report_dir, PathBuf::from("."));
        assert_eq!(config.duration_format, "a");
    }

    #[test]
    fn config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/custom.db\"\nduration_format = \"h\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.duration_format, "h");
        assert_eq!(config.report_dir, PathBuf::from("."));
    }
}
