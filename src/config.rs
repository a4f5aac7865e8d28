//! Run configuration.
//!
//! Resolved once by the binary and passed down explicitly. Layers, lowest
//! precedence first: built-in defaults, TOML config file, environment,
//! command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::{ChartSeries, Layout};
use crate::cli::GlobalArgs;
use crate::error::{Error, Result};
use crate::fetch::FetchConfig;
use crate::history::RefillPolicy;
use crate::report::ReportMode;
use crate::store::Backend;

pub const ENV_API_KEY: &str = "QUOTA_TREND_API_KEY";
pub const ENV_ENDPOINT: &str = "QUOTA_TREND_ENDPOINT";
pub const ENV_DATA_FILE: &str = "QUOTA_TREND_DATA_FILE";
pub const ENV_LOG: &str = "QUOTA_TREND_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store_backend: Backend,
    pub data_file: PathBuf,
    /// Sqlite database; defaults to the platform data directory.
    pub database_file: Option<PathBuf>,
    pub chart_file: PathBuf,
    pub report_file: PathBuf,
    pub report_mode: ReportMode,
    pub report_title: String,
    /// Defaults to "Usage over the last N days".
    pub chart_title: Option<String>,
    pub unit_label: String,
    /// Calendar days kept; zero or negative keeps everything.
    pub retention_days: i64,
    pub chart_window_days: usize,
    pub chart_series: ChartSeries,
    pub refill_policy: RefillPolicy,
    pub chart: Layout,
    pub fetch: FetchConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_backend: Backend::Json,
            data_file: PathBuf::from("data.json"),
            database_file: None,
            chart_file: PathBuf::from("chart.svg"),
            report_file: PathBuf::from("README.md"),
            report_mode: ReportMode::Overwrite,
            report_title: "API usage".to_string(),
            chart_title: None,
            unit_label: "points".to_string(),
            retention_days: 30,
            chart_window_days: 14,
            chart_series: ChartSeries::Consumed,
            refill_policy: RefillPolicy::Clamp,
            chart: Layout::default(),
            fetch: FetchConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Default config file location (~/.config/quota-trend/config.toml or platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "quota-trend")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Resolve the full configuration for a run.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Config::from_file(&path)?,
                _ => Config::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Config::from_toml(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.is_empty()) {
            self.fetch.api_key = Some(key);
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.fetch.endpoint = endpoint;
        }
        if let Some(path) = lookup(ENV_DATA_FILE) {
            self.data_file = PathBuf::from(path);
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.log.level = level;
        }
    }

    pub fn apply_args(&mut self, args: &GlobalArgs) {
        if let Some(path) = &args.data_file {
            self.data_file = path.clone();
        }
        if let Some(backend) = args.backend {
            self.store_backend = backend;
        }
        if let Some(days) = args.retention_days {
            self.retention_days = days;
        }
        if let Some(window) = args.chart_window {
            self.chart_window_days = window;
        }
        if let Some(level) = &args.log_level {
            self.log.level = level.clone();
        }
        if args.log_json {
            self.log.json = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let headroom = self.chart.headroom_factor;
        if !headroom.is_finite() || headroom <= 1.0 {
            return Err(Error::Config(format!(
                "chart.headroom_factor must be greater than 1.0, got {headroom}"
            )));
        }
        if self.chart_window_days == 0 {
            return Err(Error::Config("chart_window_days must be at least 1".to_string()));
        }
        if self.chart.value_ticks == 0 {
            return Err(Error::Config("chart.value_ticks must be at least 1".to_string()));
        }
        if self.chart.plot_width() <= 0.0 || self.chart.plot_height() <= 0.0 {
            return Err(Error::Config(format!(
                "chart canvas {}x{} leaves no room inside its margins",
                self.chart.width, self.chart.height
            )));
        }
        Ok(())
    }

    pub fn chart_title(&self) -> String {
        self.chart_title
            .clone()
            .unwrap_or_else(|| format!("Usage over the last {} days", self.chart_window_days))
    }
}
