use crate::rules::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "REGISTROD_CONFIG";
pub const PASS_AVERAGE_ENV: &str = "REGISTROD_PASS_AVERAGE";
pub const PASS_ATTENDANCE_ENV: &str = "REGISTROD_PASS_ATTENDANCE";
pub const PAGE_SIZE_ENV: &str = "REGISTROD_PAGE_SIZE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationConfig {
    pub duration_ms: u64,
    pub action: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 4000,
            action: "Sistema".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub pass_average: f64,
    pub pass_attendance: f64,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub notification: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        let t = Thresholds::default();
        Self {
            pass_average: t.pass_average,
            pass_attendance: t.pass_attendance,
            page_size: 5,
            page_size_options: vec![5, 10, 20],
            notification: NotificationConfig::default(),
        }
    }
}

impl Config {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            pass_average: self.pass_average,
            pass_attendance: self.pass_attendance,
        }
    }

    /// Defaults, then the JSON file named by `REGISTROD_CONFIG` (if set), then
    /// individual env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(p) => Self::from_file(Path::new(&p))?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(PASS_AVERAGE_ENV) {
            self.pass_average = parse_value(PASS_AVERAGE_ENV, &v)?;
        }
        if let Some(v) = lookup(PASS_ATTENDANCE_ENV) {
            self.pass_attendance = parse_value(PASS_ATTENDANCE_ENV, &v)?;
        }
        if let Some(v) = lookup(PAGE_SIZE_ENV) {
            self.page_size = parse_value(PAGE_SIZE_ENV, &v)?;
        }
        Ok(())
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "pageSize".into(),
                value: "0".into(),
            });
        }
        if !self.pass_average.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "passAverage".into(),
                value: self.pass_average.to_string(),
            });
        }
        if !self.pass_attendance.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "passAttendance".into(),
                value: self.pass_attendance.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
