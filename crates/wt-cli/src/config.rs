//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wt_core::Schedule;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Schedule used for records with no earlier record to inherit from.
    ///
    /// Installed into the database on first open; afterwards the stored
    /// schedule of the same name takes precedence.
    pub default_schedule: Schedule,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("wt.db"),
            default_schedule: Schedule::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources override earlier ones: defaults, the user config file,
    /// `config_path`, then `WT_*` environment variables. Nested keys use a
    /// double underscore, e.g. `WT_DEFAULT_SCHEDULE__BEGIN=09:00`.
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

        figment = figment.merge(Env::prefixed("WT_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for wt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wt"))
}

/// Returns the platform-specific data directory for wt.
///
/// On Linux: `~/.local/share/wt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wt_core::{TimeInterval, TimeOfDay};

    #[test]
    fn dirs_data_path_ends_with_wt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "wt");
    }

    #[test]
    fn default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("wt.db"));
        assert_eq!(config.default_schedule, Schedule::default());
    }

    #[test]
    fn config_file_overrides_default_schedule() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
database_path = "/tmp/wt-test.db"

[default_schedule]
name = "default"
begin = "09:00"
end = "18:00"
lunch_begin = "13:00"
lunch_end = "14:00"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.as_path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/wt-test.db"));
        assert_eq!(config.default_schedule.begin(), TimeOfDay::from_hm(9, 0));
        assert_eq!(
            config.default_schedule.lunch(),
            TimeInterval::from_hm(13, 0, 14, 0)
        );
    }

    #[test]
    fn config_rejects_invalid_default_schedule() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[default_schedule]
name = "default"
begin = "17:00"
end = "08:00"
lunch_begin = "12:00"
lunch_end = "13:00"
"#,
        )
        .unwrap();

        assert!(Config::load_from(Some(path.as_path())).is_err());
    }
}
