//! Configuration management.
//!
//! Configuration is read from `~/.config/magpie/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. Missing keys fall back to their defaults, so partial files are
//! fine.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root folder for saved posts.
    pub output_folder: PathBuf,
    /// Folder holding the persistent browser profile (cookies, login).
    pub browser_state_dir: PathBuf,
    /// Folder for raw markup snapshots written on degraded parses.
    pub debug_dir: PathBuf,
    /// Scan cap: stop collecting previews past this count.
    pub max_posts: usize,
    /// Run the scraping browser without a visible window. Login is always
    /// headful.
    pub headless: bool,
    /// Group saved posts into one subfolder per profile.
    pub per_profile_subfolders: bool,
    /// Randomized pause between feed scrolls, lower bound.
    pub scroll_delay_min_ms: u64,
    /// Randomized pause between feed scrolls, upper bound.
    pub scroll_delay_max_ms: u64,
    /// Consecutive scrolls revealing nothing new before a scan gives up.
    pub max_empty_scrolls: u32,
    /// How long `magpie login` waits for the interactive login.
    pub login_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("output"),
            browser_state_dir: PathBuf::from("browser_state"),
            debug_dir: PathBuf::from("debug"),
            max_posts: 50,
            headless: true,
            per_profile_subfolders: true,
            scroll_delay_min_ms: 1500,
            scroll_delay_max_ms: 3000,
            max_empty_scrolls: 3,
            login_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating a commented
    /// default file when none exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/magpie/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("magpie").join("config.toml"))
    }

    /// Resolved output root. Relative paths live under the app data dir.
    pub fn output_root(&self) -> PathBuf {
        self.resolve(&self.output_folder)
    }

    pub fn browser_state_root(&self) -> PathBuf {
        self.resolve(&self.browser_state_dir)
    }

    pub fn debug_root(&self) -> PathBuf {
        self.resolve(&self.debug_dir)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Self::data_root().join(path)
        }
    }

    /// `~/.local/share/magpie` (platform equivalent), falling back to the
    /// working directory when the platform reports no data dir.
    fn data_root() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("magpie"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# magpie configuration
#
# Relative paths are resolved under the application data directory
# (e.g. ~/.local/share/magpie). Absolute paths are used as-is.

# Root folder for saved posts. With per_profile_subfolders enabled, each
# profile gets its own subfolder: output/<profile>/<date>_<slug>.md
output_folder = "output"

# Persistent browser profile. Login state survives here across runs, so
# logging in is a one-time cost per machine. Do not share this directory
# between concurrently running processes.
browser_state_dir = "browser_state"

# Raw markup snapshots, written whenever a parse comes back unexpectedly
# empty. Useful for repairing selectors offline without re-scraping.
debug_dir = "debug"

# Stop scanning once this many post previews have been collected.
max_posts = 50

# Run the scraping browser without a visible window. The login flow always
# opens a visible window regardless.
headless = true

# Group saved posts into one subfolder per profile.
per_profile_subfolders = true

# Randomized pause between feed scrolls, in milliseconds. A fixed cadence
# is an easy automated-traffic signature, so a uniform value in this range
# is drawn for every scroll.
scroll_delay_min_ms = 1500
scroll_delay_max_ms = 3000

# Consecutive scrolls revealing no new posts before a scan decides the
# feed is exhausted.
max_empty_scrolls = 3

# How long `magpie login` waits for the interactive login to finish.
login_timeout_secs = 300
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config =
            toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.max_posts, 50);
        assert_eq!(config.output_folder, PathBuf::from("output"));
        assert_eq!(config.browser_state_dir, PathBuf::from("browser_state"));
        assert!(config.headless);
        assert!(config.per_profile_subfolders);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
max_posts = 10
headless = false
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.max_posts, 10);
        assert!(!config.headless);
        // Defaults fill the rest.
        assert_eq!(config.scroll_delay_min_ms, 1500);
        assert_eq!(config.scroll_delay_max_ms, 3000);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.max_posts, 50);
        assert_eq!(config.max_empty_scrolls, 3);
    }

    #[test]
    fn test_absolute_paths_kept() {
        let config = Config {
            output_folder: PathBuf::from("/tmp/posts"),
            ..Default::default()
        };
        assert_eq!(config.output_root(), PathBuf::from("/tmp/posts"));
    }

    #[test]
    fn test_login_timeout() {
        assert_eq!(Config::default().login_timeout(), Duration::from_secs(300));
    }
}
