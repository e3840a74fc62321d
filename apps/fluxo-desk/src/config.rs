//! # Desk Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Environment variables (FLUXO_*)          highest                    │
//! │  2. desk.toml in the platform config dir                                │
//! │  3. Defaults (this file)                     lowest                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example `desk.toml`
//! ```toml
//! [store]
//! name = "Lanchonete da Praça"
//!
//! [currency]
//! symbol = "R$"
//! decimal_separator = ","
//! thousands_separator = "."
//! symbol_spacing = true
//!
//! [database]
//! max_connections = 5
//!
//! [reports]
//! advisory_recent = 20
//! top_products = 5
//! utc_offset_minutes = -180
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use fluxo_core::{CurrencyFormat, DEFAULT_ADVISORY_RECENT, DEFAULT_TOP_PRODUCTS};

pub const CONFIG_FILE_NAME: &str = "desk.toml";
pub const DATABASE_FILE_NAME: &str = "fluxo.db";

/// Brasília, UTC-3.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine platform directories")]
    NoPlatformDirs,

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Shown in the status line and report headers.
    pub name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: "Fluxo".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub symbol: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
    pub symbol_spacing: bool,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        let brl = CurrencyFormat::brl();
        CurrencyConfig {
            symbol: brl.symbol,
            decimal_separator: brl.decimal_separator,
            thousands_separator: brl.thousands_separator,
            symbol_spacing: brl.symbol_spacing,
        }
    }
}

impl From<&CurrencyConfig> for CurrencyFormat {
    fn from(config: &CurrencyConfig) -> Self {
        CurrencyFormat {
            symbol: config.symbol.clone(),
            decimal_separator: config.decimal_separator.clone(),
            thousands_separator: config.thousands_separator.clone(),
            symbol_spacing: config.symbol_spacing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file. `None` means the platform data directory.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Transactions included in the advisory snapshot.
    pub advisory_recent: usize,
    /// Entries in the top-products ranking.
    pub top_products: usize,
    /// Offset used to decide which calendar day a sale belongs to.
    pub utc_offset_minutes: i32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        ReportsConfig {
            advisory_recent: DEFAULT_ADVISORY_RECENT,
            top_products: DEFAULT_TOP_PRODUCTS,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

// =============================================================================
// DeskConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub store: StoreConfig,
    pub currency: CurrencyConfig,
    pub database: DatabaseConfig,
    pub reports: ReportsConfig,
}

impl DeskConfig {
    /// Reads `path`, applies environment overrides and validates.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&text, path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded desk config");
        Ok(config)
    }

    /// Like [`DeskConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            return Self::load(path);
        }

        info!(path = %path.display(), "No config file, using defaults");
        let mut config = DeskConfig::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(text: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `FLUXO_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("FLUXO_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(name) = lookup("FLUXO_STORE_NAME") {
            self.store.name = name;
        }
        if let Some(symbol) = lookup("FLUXO_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }
        if let Some(value) = lookup("FLUXO_ADVISORY_RECENT") {
            self.reports.advisory_recent = parse_count("FLUXO_ADVISORY_RECENT", &value)?;
        }
        if let Some(value) = lookup("FLUXO_TOP_PRODUCTS") {
            self.reports.top_products = parse_count("FLUXO_TOP_PRODUCTS", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(invalid("store.name", "must not be empty"));
        }
        if self.currency.symbol.trim().is_empty() {
            return Err(invalid("currency.symbol", "must not be empty"));
        }
        if self.currency.decimal_separator.is_empty() {
            return Err(invalid("currency.decimal_separator", "must not be empty"));
        }
        if self.currency.decimal_separator == self.currency.thousands_separator {
            return Err(invalid(
                "currency.thousands_separator",
                "must differ from the decimal separator",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be at least 1"));
        }
        if self.reports.top_products == 0 {
            return Err(invalid("reports.top_products", "must be at least 1"));
        }
        // chrono rejects offsets of a full day or more
        if self.reports.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(invalid("reports.utc_offset_minutes", "must be within ±23:59"));
        }
        Ok(())
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::from(&self.currency)
    }

    /// Day-bucketing offset. Falls back to UTC for an unvalidated config.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reports.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// The configured database path, or `fluxo.db` in the platform data dir.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let dirs = project_dirs()?;
        Ok(dirs.data_dir().join(DATABASE_FILE_NAME))
    }
}

/// `desk.toml` in the platform config directory.
///
/// - **Linux**: `~/.config/fluxo-desk/desk.toml`
/// - **macOS**: `~/Library/Application Support/com.fluxo.desk/desk.toml`
/// - **Windows**: `%APPDATA%\fluxo\desk\config\desk.toml`
pub fn default_config_path() -> ConfigResult<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "fluxo", "desk").ok_or(ConfigError::NoPlatformDirs)
}

fn parse_count(key: &str, value: &str) -> ConfigResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, &format!("expected a whole number, got {:?}", value)))
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("fluxo-desk-{}", uuid::Uuid::new_v4()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = DeskConfig::default();
        config.validate().unwrap();
        assert_eq!(config.reports.advisory_recent, 20);
        assert_eq!(config.reports.top_products, 5);
        assert_eq!(config.utc_offset().local_minus_utc(), -3 * 3600);
        assert_eq!(config.currency_format(), CurrencyFormat::brl());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let text = r#"
            [store]
            name = "Cantina"

            [reports]
            top_products = 3
        "#;
        let config = DeskConfig::parse(text, Path::new("desk.toml")).unwrap();
        assert_eq!(config.store.name, "Cantina");
        assert_eq!(config.reports.top_products, 3);
        assert_eq!(config.reports.advisory_recent, 20);
        assert_eq!(config.currency.symbol, "R$");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FLUXO_DB_PATH", "/tmp/x.db"),
            ("FLUXO_STORE_NAME", "Banca"),
            ("FLUXO_CURRENCY_SYMBOL", "US$"),
            ("FLUXO_ADVISORY_RECENT", "7"),
        ]
        .into_iter()
        .collect();

        let mut config = DeskConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/x.db"));
        assert_eq!(config.store.name, "Banca");
        assert_eq!(config.currency.symbol, "US$");
        assert_eq!(config.reports.advisory_recent, 7);
        assert_eq!(config.reports.top_products, 5);
    }

    #[test]
    fn test_bad_env_number_rejected() {
        let mut config = DeskConfig::default();
        let err = config
            .apply_env(|k| (k == "FLUXO_TOP_PRODUCTS").then(|| "cinco".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DeskConfig::default();
        config.currency.thousands_separator = ",".to_string();
        assert!(config.validate().is_err());

        let mut config = DeskConfig::default();
        config.reports.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());

        let mut config = DeskConfig::default();
        config.store.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path();
        let mut config = DeskConfig::default();
        config.store.name = "Quiosque".to_string();
        config.reports.utc_offset_minutes = 0;

        config.save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let loaded = DeskConfig::parse(&text, &path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let err = DeskConfig::parse("[store\nname=", Path::new("desk.toml")).unwrap_err();
        assert!(err.to_string().contains("desk.toml"));
    }
}
