//! Configuration: defaults, then the optional TOML file, then environment,
//! then command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LogwallError, Result};

/// Capacity of each source's event channel
pub const DEFAULT_CHANNEL_BUFFER: usize = 1024;

/// Lines kept per source
pub const DEFAULT_MAX_LINES: usize = 2000;

/// Render tick cadence
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Where `save bookmarks` writes, relative to the working directory
pub const DEFAULT_BOOKMARK_PATH: &str = "bookmarks.txt";

/// Probed in order when no files are given on the command line
pub const DEFAULT_LOG_PATHS: &[&str] = &[
    "/var/log/syslog",
    "/var/log/messages",
    "/var/log/kern.log",
    "/var/log/dmesg",
    "/var/log/auth.log",
    "/var/log/system.log",
    "/var/log/daemon.log",
];

/// The entries of `DEFAULT_LOG_PATHS` that exist on this machine
pub fn existing_default_logs() -> Vec<PathBuf> {
    existing_paths(DEFAULT_LOG_PATHS)
}

fn existing_paths(candidates: &[&str]) -> Vec<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .filter(|path| path.exists())
        .collect()
}

/// Configuration for logwall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of lines kept per source
    pub max_lines: usize,
    /// How often panels are re-rendered
    pub tick: Duration,
    /// Bookmark export file
    pub bookmark_path: PathBuf,
    /// Theme name, see `Theme::by_name`
    pub theme: String,
    /// Diagnostics log; `None` uses the cache directory
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            bookmark_path: PathBuf::from(DEFAULT_BOOKMARK_PATH),
            theme: "default".to_string(),
            log_file: None,
        }
    }
}

/// The on-disk config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub max_lines: Option<usize>,
    pub tick_ms: Option<u64>,
    pub bookmark_path: Option<PathBuf>,
    pub theme: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| LogwallError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read `path`. A missing file is an empty config unless `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(e) => Err(LogwallError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }
}

/// Overrides from the command line
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub max_lines: Option<usize>,
    pub tick_ms: Option<u64>,
    pub bookmark_path: Option<PathBuf>,
    pub theme: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// `<config dir>/logwall/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("logwall").join("config.toml"))
    }

    /// Build the effective config. An explicit `config_path` must exist.
    pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => FileConfig::load(path, true)?,
            None => match Self::default_path() {
                Some(path) => FileConfig::load(&path, false)?,
                None => FileConfig::default(),
            },
        };

        let mut config = Self::default();
        config.apply_file(file);
        config.apply_env();
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(max_lines) = file.max_lines {
            self.max_lines = max_lines;
        }
        if let Some(ms) = file.tick_ms {
            self.tick = Duration::from_millis(ms);
        }
        if let Some(path) = file.bookmark_path {
            self.bookmark_path = path;
        }
        if let Some(theme) = file.theme {
            self.theme = theme;
        }
        if file.log_file.is_some() {
            self.log_file = file.log_file;
        }
        self.normalize();
    }

    /// `LOGWALL_MAX_LINES` overrides the file setting
    pub fn apply_env(&mut self) {
        if let Some(max_lines) = std::env::var("LOGWALL_MAX_LINES")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.max_lines = max_lines;
        }
        self.normalize();
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(max_lines) = cli.max_lines {
            self.max_lines = max_lines;
        }
        if let Some(ms) = cli.tick_ms {
            self.tick = Duration::from_millis(ms);
        }
        if let Some(path) = &cli.bookmark_path {
            self.bookmark_path = path.clone();
        }
        if let Some(theme) = &cli.theme {
            self.theme = theme.clone();
        }
        if cli.log_file.is_some() {
            self.log_file = cli.log_file.clone();
        }
        self.normalize();
    }

    /// A zero capacity or zero tick would make the viewer useless
    fn normalize(&mut self) {
        self.max_lines = self.max_lines.max(1);
        if self.tick.is_zero() {
            self.tick = Duration::from_millis(DEFAULT_TICK_MS);
        }
    }

    /// Diagnostics log path, falling back to `<cache dir>/logwall/logwall.log`
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("logwall").join("logwall.log")))
    }
}
