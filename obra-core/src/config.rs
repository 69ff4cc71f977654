use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Language sent to the geocoder when none is configured.
pub const DEFAULT_LANGUAGE: &str = "pt";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Overrides the platform-default database location.
    pub database_path: Option<PathBuf>,

    /// Language tag for geocoding results, e.g. "pt" or "en".
    pub language: Option<String>,
}

impl Config {
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Resolved database path: the explicit override, or `obra.db` in the
    /// platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        Ok(project_dirs()?.data_dir().join("obra.db"))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "obra", "obra-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_falls_back_to_default() {
        let cfg = Config::default();
        assert_eq!(cfg.language(), DEFAULT_LANGUAGE);

        let cfg = Config {
            language: Some("en".to_owned()),
            ..Config::default()
        };
        assert_eq!(cfg.language(), "en");
    }

    #[test]
    fn explicit_database_path_wins() {
        let cfg = Config {
            database_path: Some(PathBuf::from("/tmp/custom/obra.db")),
            ..Config::default()
        };
        assert_eq!(
            cfg.database_path().unwrap(),
            PathBuf::from("/tmp/custom/obra.db")
        );
    }

    #[test]
    fn default_database_path_is_under_the_data_dir() {
        let cfg = Config::default();
        let path = cfg.database_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "obra.db");
    }
}
