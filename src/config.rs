use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub clone: CloneConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search CLI to invoke (`gh search repos ...`)
    pub command: String,
    pub default_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    pub command: String,
    pub depth: u32,
    pub timeout_seconds: u64,
    /// Prefix of the per-run directory created under the system temp dir
    pub workspace_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub excluded_dir_prefixes: Vec<String>,
    pub excluded_dir_names: Vec<String>,
    pub max_listed_matches: usize,
    pub top_extensions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub write_json: bool,
}

pub const DEFAULT_LIMIT: usize = 10;

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            command: "gh".to_string(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            command: "git".to_string(),
            depth: 1,
            timeout_seconds: 60,
            workspace_prefix: "repo-scout".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_dir_prefixes: vec![".git".to_string()],
            excluded_dir_names: vec!["node_modules".to_string()],
            max_listed_matches: 10,
            top_extensions: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            write_json: false,
        }
    }
}

impl Config {
    /// Get the default config file path (~/.repo-scout.toml)
    pub fn default_config_path() -> crate::Result<PathBuf> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(PathBuf::from(home_dir).join(".repo-scout.toml"))
    }

    /// Load config from the default location, falling back to defaults if the file doesn't exist
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            info!("Loading configuration from {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            info!("No config file at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create a config file with all available options documented
    pub fn create_documented_config() -> String {
        r#"# repo-scout configuration file

[search]
# Command-line search tool; it must understand `search repos <query> --limit <n> --json <fields>`
command = "gh"

# Number of repositories requested when --limit is absent or not a number
default_limit = 10

[clone]
command = "git"

# Shallow clone depth
depth = 1

# Clones still running after this many seconds are abandoned
timeout_seconds = 60

# Clones are placed under <system temp>/<workspace_prefix>-<timestamp>-<pid>
workspace_prefix = "repo-scout"

[scan]
# Directories whose name starts with one of these are never descended into
excluded_dir_prefixes = [".git"]

# Directories with exactly one of these names are never descended into
excluded_dir_names = ["node_modules"]

# Matching files listed per repository before "...and N more"
max_listed_matches = 10

# File extensions shown per repository
top_extensions = 5

[output]
# Where the timestamped report file is written
directory = "."

# Also write the raw results as JSON next to the Markdown report
write_json = false
"#
        .to_string()
    }
}
