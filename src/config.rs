use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) offline: bool,
    #[serde(default)]
    pub(crate) no_cost: bool,
    #[serde(default)]
    pub(crate) no_color: bool,
    #[serde(default)]
    pub(crate) compact: bool,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) locale: Option<String>,
    /// `all`, `claude`, `codex` or an alias
    #[serde(default)]
    pub(crate) source: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    #[serde(default)]
    pub(crate) scan_ceiling: Option<usize>,
    #[serde(default)]
    pub(crate) head_records: Option<usize>,
    /// Claude config directories; `projects` is appended to each
    #[serde(default)]
    pub(crate) claude_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub(crate) codex_home: Option<PathBuf>,
}

impl Config {
    /// First config file that exists and parses, else defaults
    pub(crate) fn load() -> Self {
        for path in Self::get_config_paths() {
            if let Some(config) = Self::load_from(&path) {
                return config;
            }
        }
        Self::default()
    }

    fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config");
                return None;
            }
        };
        match toml::from_str::<Config>(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                Some(config.expand_home())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse config");
                None
            }
        }
    }

    /// Resolve a leading `~/` in configured directories
    fn expand_home(mut self) -> Self {
        let Some(home) = dirs::home_dir() else {
            return self;
        };
        let expand = |p: PathBuf| match p.strip_prefix("~") {
            Ok(rest) => home.join(rest),
            Err(_) => p,
        };
        self.claude_dirs = self.claude_dirs.into_iter().map(expand).collect();
        self.codex_home = self.codex_home.map(expand);
        self
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/ccresume/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("ccresume").join("config.toml"));
        }

        // 2. Platform config dir (Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("ccresume").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.ccresume.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ccresume.toml"));
        }

        paths
    }
}
