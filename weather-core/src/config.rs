use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::auth::Role;
use crate::provider::weatherapi::DEFAULT_BASE_URL;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite://weather.db`.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://weather.db".to_string(),
        }
    }
}

/// Credentials and endpoint for WeatherAPI.com.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 30 * 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Role handed to newly registered users.
    pub default_role: String,
    /// Access token lifetime in hours; 0 keeps tokens valid until logout.
    pub token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_role: Role::User.as_str().to_string(),
            token_ttl_hours: 0,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [provider]
/// api_key = "..."
///
/// [server]
/// listen = "0.0.0.0:8000"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Load config from `path`, or return defaults if the file doesn't exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Load from `path` (or the platform default), then apply `.env` and
    /// environment overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };
        let mut cfg = Self::load(&path)?;
        cfg.apply_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("WEATHER_API_KEY") {
            self.provider.api_key = key;
        }
        if let Some(url) = lookup("WEATHER_API_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(listen) = lookup("WEATHER_LISTEN") {
            self.server.listen = listen;
        }
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-api")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace the provider API key.
    pub fn set_api_key(&mut self, api_key: String) {
        self.provider.api_key = api_key;
    }

    pub fn is_provider_configured(&self) -> bool {
        !self.provider.api_key.trim().is_empty()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Access token lifetime, `None` when tokens never expire.
    pub fn token_ttl(&self) -> Result<Option<chrono::Duration>> {
        match self.auth.token_ttl_hours {
            0 => Ok(None),
            hours => i64::try_from(hours)
                .ok()
                .and_then(chrono::Duration::try_hours)
                .map(Some)
                .ok_or_else(|| anyhow!("auth.token_ttl_hours is too large: {hours}")),
        }
    }

    pub fn default_role(&self) -> Result<Role> {
        Role::parse(&self.auth.default_role)
            .ok_or_else(|| anyhow!("Unknown default role '{}'", self.auth.default_role))
    }

    /// Check everything `serve` needs.
    pub fn validate(&self) -> Result<()> {
        if !self.is_provider_configured() {
            bail!(
                "No API key configured for the weather provider.\n\
                 Hint: run `weather-api configure` or set WEATHER_API_KEY."
            );
        }
        if self.cache.ttl_secs == 0 {
            bail!("cache.ttl_secs must be greater than zero");
        }
        self.default_role()?;
        self.token_ttl()?;
        Ok(())
    }
}
