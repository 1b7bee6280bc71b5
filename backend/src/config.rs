//! # Registry Configuration
//!
//! Settings for one installation, kept as `registry_config.yaml` at the root
//! of the data directory next to the files it names:
//!
//! ```text
//! Registro Civil/
//! ├── registry_config.yaml      ← this module manages this file
//! ├── registro_civil.db         ← durable record store
//! └── RegistroCivilPrefs.yaml   ← draft cache
//! ```
//!
//! ## YAML Format
//!
//! ```yaml
//! database_file: registro_civil.db
//! draft_file: RegistroCivilPrefs.yaml
//! qr_size: 512
//! log_level: info
//! ```
//!
//! Missing keys take their defaults. The data directory itself is not stored;
//! it is wherever the file was loaded from.

use anyhow::{Context, Result};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::qr_encoder::{DEFAULT_QR_SIZE, MIN_QR_SIZE};

pub const CONFIG_FILE_NAME: &str = "registry_config.yaml";
/// Overrides the platform data directory when set
pub const DATA_DIR_ENV: &str = "REGISTRO_CIVIL_DATA_DIR";
pub const DEFAULT_DATABASE_FILE: &str = "registro_civil.db";
pub const DEFAULT_DRAFT_FILE: &str = "RegistroCivilPrefs.yaml";
const DATA_DIR_NAME: &str = "Registro Civil";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    #[serde(skip)]
    pub data_directory: PathBuf,
    /// SQLite file name, relative to the data directory
    pub database_file: String,
    /// Draft cache file name, relative to the data directory
    pub draft_file: String,
    /// Edge length of generated QR images in pixels
    pub qr_size: u32,
    /// Default log level; `RUST_LOG` takes precedence
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            draft_file: DEFAULT_DRAFT_FILE.to_string(),
            qr_size: DEFAULT_QR_SIZE,
            log_level: "info".to_string(),
        }
    }
}

/// `$REGISTRO_CIVIL_DATA_DIR`, else the platform data directory, else the
/// working directory
pub fn default_data_directory() -> PathBuf {
    resolve_data_directory(std::env::var_os(DATA_DIR_ENV), dirs::data_dir())
}

fn resolve_data_directory(
    env_override: Option<OsString>,
    platform_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    match platform_dir {
        Some(dir) => dir.join(DATA_DIR_NAME),
        None => PathBuf::from("."),
    }
}

impl RegistryConfig {
    /// Defaults rooted at `data_directory`
    pub fn with_data_directory<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            data_directory: data_directory.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Read `registry_config.yaml` from `data_directory`, or fall back to
    /// defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let data_directory = data_directory.as_ref();
        let config_path = data_directory.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: RegistryConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
            debug!("Loaded registry config from {:?}", config_path);
            config
        } else {
            info!("No registry config at {:?}, using defaults", config_path);
            RegistryConfig::default()
        };

        config.data_directory = data_directory.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Write the config into its data directory
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(&self.data_directory)?;

        let config_path = self.config_path();
        let yaml_content = serde_yaml::to_string(self)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved registry config to {:?}", config_path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.qr_size < MIN_QR_SIZE {
            anyhow::bail!("qr_size must be at least {}, got {}", MIN_QR_SIZE, self.qr_size);
        }
        if self.database_file.trim().is_empty() {
            anyhow::bail!("database_file must not be empty");
        }
        if self.draft_file.trim().is_empty() {
            anyhow::bail!("draft_file must not be empty");
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("Unknown log level '{}'", self.log_level))
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_directory.join(CONFIG_FILE_NAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_directory.join(&self.database_file)
    }

    pub fn draft_path(&self) -> PathBuf {
        self.data_directory.join(&self.draft_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = RegistryConfig::load_or_default(temp_dir.path()).unwrap();

        assert_eq!(config.data_directory, temp_dir.path());
        assert_eq!(config.qr_size, 512);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.database_path(), temp_dir.path().join("registro_civil.db"));
        assert_eq!(config.draft_path(), temp_dir.path().join("RegistroCivilPrefs.yaml"));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = RegistryConfig::with_data_directory(temp_dir.path().join("nested"));
        config.qr_size = 300;
        config.log_level = "debug".to_string();
        config.save().unwrap();

        let loaded = RegistryConfig::load_or_default(temp_dir.path().join("nested")).unwrap();
        assert_eq!(loaded, config);
        assert!(!temp_dir.path().join("nested").join("registry_config.tmp").exists());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "qr_size: 256\n").unwrap();

        let config = RegistryConfig::load_or_default(temp_dir.path()).unwrap();
        assert_eq!(config.qr_size, 256);
        assert_eq!(config.database_file, DEFAULT_DATABASE_FILE);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "qr_size: 20\n").unwrap();
        assert!(RegistryConfig::load_or_default(temp_dir.path()).is_err());

        let mut config = RegistryConfig::with_data_directory(temp_dir.path());
        config.draft_file = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = RegistryConfig::with_data_directory(temp_dir.path());
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_data_directory_resolution() {
        let platform = || Some(PathBuf::from("/home/u/.local/share"));
        assert_eq!(
            resolve_data_directory(Some(OsString::from("/srv/registro")), platform()),
            PathBuf::from("/srv/registro")
        );
        assert_eq!(
            resolve_data_directory(Some(OsString::new()), platform()),
            PathBuf::from("/home/u/.local/share/Registro Civil")
        );
        assert_eq!(resolve_data_directory(None, None), PathBuf::from("."));
    }
}
