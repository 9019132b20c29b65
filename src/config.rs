use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// SQLite connection string, e.g. `sqlite:data/finch.db`.
    pub database_url: String,

    pub log_level: String,

    /// Tokio worker threads. 0 = runtime default.
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/finch.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Set the `Secure` attribute on session cookies (requires HTTPS).
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default 8 MiB).
    pub argon2_memory_cost_kib: u32,

    /// Argon2 iteration count.
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (lanes).
    pub argon2_parallelism: u32,

    /// Accounts that sign up with this secret become admins. None disables.
    pub admin_password: Option<String>,

    /// Sessions expire after this many minutes of inactivity.
    pub session_ttl_minutes: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            admin_password: None,
            session_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Load config from the first path that exists, falling back to defaults.
    ///
    /// A non-empty `DATABASE_URL` environment variable overrides
    /// `general.database_url` from any source.
    pub fn load() -> Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Ok(Self::apply_env(Self::load_from_path(&path)?));
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::apply_env(Self::default()))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env(mut config: Self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            config.general.database_url = url;
        }
        config
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_paths()
            .into_iter()
            .next()
            .context("No config path available")?;
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Candidate config locations, in priority order.
    #[must_use]
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("finch").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".finch").join("config.toml"));
        }

        paths
    }

    /// Write a default config.toml in the working directory unless one exists.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = PathBuf::from("config.toml");

        if path.exists() {
            info!("Config file already exists: {}", path.display());
            return Ok(path);
        }

        let config = Self::default();
        config.save_to_path(&path)?;
        info!("Created default config file: {}", path.display());

        Ok(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.is_empty() {
            anyhow::bail!("general.database_url must not be empty");
        }

        if self.security.session_ttl_minutes <= 0 {
            anyhow::bail!("security.session_ttl_minutes must be positive");
        }

        if self.security.argon2_memory_cost_kib < 8 {
            anyhow::bail!("security.argon2_memory_cost_kib must be at least 8");
        }

        if self.security.argon2_time_cost == 0 {
            anyhow::bail!("security.argon2_time_cost must be at least 1");
        }

        if self.security.argon2_parallelism == 0 {
            anyhow::bail!("security.argon2_parallelism must be at least 1");
        }

        if self.observability.loki_enabled && self.observability.loki_url.is_empty() {
            anyhow::bail!("observability.loki_url must be set when loki_enabled is true");
        }

        Ok(())
    }
}
