use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::{Sex, Statistic};

/// Explicit config file path.
pub const CONFIG_ENV: &str = "WHO_DASHBOARD_CONFIG";
/// Overrides `[data] dir`.
pub const DATA_DIR_ENV: &str = "WHO_DASHBOARD_DATA_DIR";
/// Looked up in the working directory when `WHO_DASHBOARD_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub defaults: SelectionDefaults,
    pub window: WindowConfig,
}

/// Where the three statistic tables live.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub deaths: String,
    pub population: String,
    pub rate: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            deaths: Statistic::Deaths.default_file().into(),
            population: Statistic::Population.default_file().into(),
            rate: Statistic::Rate.default_file().into(),
        }
    }
}

impl DataConfig {
    pub fn path_for(&self, statistic: Statistic) -> PathBuf {
        let file = match statistic {
            Statistic::Deaths => &self.deaths,
            Statistic::Population => &self.population,
            Statistic::Rate => &self.rate,
        };
        self.dir.join(file)
    }
}

/// Initial control values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectionDefaults {
    pub statistic: Statistic,
    pub sex: Sex,
    pub year: i32,
    pub countries: Vec<String>,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            statistic: Statistic::Deaths,
            sex: Sex::All,
            year: 2000,
            countries: vec!["United States of America".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 900.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution: defaults → TOML file → environment
// ---------------------------------------------------------------------------

/// Resolve the configuration for this process.
pub fn load_config() -> Result<DashboardConfig> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let mut config = match &explicit {
        Some(path) => from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => from_file(Path::new(DEFAULT_CONFIG_FILE))?,
        None => {
            log::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            DashboardConfig::default()
        }
    };
    config.apply_env(|key| std::env::var(key).ok());
    log::info!("data directory: {}", config.data.dir.display());
    Ok(config)
}

fn from_file(path: &Path) -> Result<DashboardConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

impl DashboardConfig {
    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            self.data.dir = PathBuf::from(dir);
        }
    }
}
