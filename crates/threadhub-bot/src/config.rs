//! Configuration management for threadhub.
//!
//! Loads configuration from ${THREADHUB_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use threadhub_core::HubSettings;

/// Discord caps a single history fetch at this many messages.
const MAX_HISTORY_WINDOW: usize = 100;
/// Discord caps a select menu at this many options.
const MAX_SELECT_MENU_OPTIONS: usize = 25;

pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

pub mod paths {
    //! Path resolution for threadhub configuration.
    //!
    //! THREADHUB_HOME resolution order:
    //! 1. THREADHUB_HOME environment variable (if set)
    //! 2. ~/.config/threadhub (default)

    use std::path::PathBuf;

    pub fn threadhub_home() -> PathBuf {
        if let Ok(home) = std::env::var("THREADHUB_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".threadhub"),
            |h| h.join(".config").join("threadhub"),
        )
    }

    pub fn config_path() -> PathBuf {
        threadhub_home().join("config.toml")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub suffix: String,
    pub history_window: usize,
    pub archive_page_limit: usize,
    pub select_menu_limit: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            suffix: HubSettings::DEFAULT_SUFFIX.to_string(),
            history_window: HubSettings::DEFAULT_HISTORY_WINDOW,
            archive_page_limit: HubSettings::DEFAULT_ARCHIVE_PAGE_LIMIT,
            select_menu_limit: HubSettings::DEFAULT_SELECT_MENU_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Seconds between presence updates; 0 disables them.
    pub interval_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self { interval_secs: 600 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discord: DiscordConfig,
    pub hub: HubConfig,
    pub presence: PresenceConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a commented config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Engine settings with platform caps applied.
    pub fn hub_settings(&self) -> Result<HubSettings> {
        let suffix = self.hub.suffix.trim();
        if suffix.is_empty() {
            bail!("hub.suffix must not be empty");
        }

        Ok(HubSettings {
            suffix: suffix.to_string(),
            history_window: self.hub.history_window.clamp(1, MAX_HISTORY_WINDOW),
            archive_page_limit: self.hub.archive_page_limit.max(1),
            select_menu_limit: self.hub.select_menu_limit.clamp(1, MAX_SELECT_MENU_OPTIONS),
        })
    }

    pub fn presence_interval(&self) -> Option<Duration> {
        (self.presence.interval_secs > 0).then(|| Duration::from_secs(self.presence.interval_secs))
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub struct DiscordSettings {
    pub token: String,
}

impl DiscordSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let env_token = std::env::var(TOKEN_ENV).ok();
        let Some(token) = resolve_token(config.discord.token.as_deref(), env_token) else {
            bail!("discord.token or {TOKEN_ENV} is required");
        };
        Ok(Self { token })
    }
}

/// The configured token wins; the environment is the fallback.
fn resolve_token(configured: Option<&str>, env: Option<String>) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .or_else(|| {
            env.map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.hub_settings().unwrap(), HubSettings::default());
    }

    #[test]
    fn partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[hub]\nsuffix = \"-threads\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.hub.suffix, "-threads");
        assert_eq!(config.hub.history_window, 50);
        assert_eq!(config.presence.interval_secs, 600);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[hub\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn init_writes_template_and_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::init(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# token ="));
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        assert!(Config::init(&path).is_err());
    }

    #[test]
    fn settings_are_clamped_to_platform_caps() {
        let config = Config {
            hub: HubConfig {
                suffix: " -hub ".to_string(),
                history_window: 500,
                archive_page_limit: 0,
                select_menu_limit: 40,
            },
            ..Config::default()
        };
        let settings = config.hub_settings().unwrap();
        assert_eq!(settings.suffix, "-hub");
        assert_eq!(settings.history_window, 100);
        assert_eq!(settings.archive_page_limit, 1);
        assert_eq!(settings.select_menu_limit, 25);
    }

    #[test]
    fn blank_suffix_is_rejected() {
        let config = Config {
            hub: HubConfig {
                suffix: "  ".to_string(),
                ..HubConfig::default()
            },
            ..Config::default()
        };
        assert!(config.hub_settings().is_err());
    }

    #[test]
    fn presence_interval_zero_disables() {
        let mut config = Config::default();
        assert_eq!(config.presence_interval(), Some(Duration::from_secs(600)));
        config.presence.interval_secs = 0;
        assert_eq!(config.presence_interval(), None);
    }

    #[test]
    fn token_resolution_prefers_config() {
        assert_eq!(
            resolve_token(Some(" abc "), Some("env".into())),
            Some("abc".to_string())
        );
        assert_eq!(
            resolve_token(Some("   "), Some(" env ".into())),
            Some("env".to_string())
        );
        assert_eq!(resolve_token(None, Some(String::new())), None);
        assert_eq!(resolve_token(None, None), None);
    }
}
