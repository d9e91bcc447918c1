// config.rs
use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Operations API endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Where the bearer token is persisted between runs
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub token_dir: PathBuf,
    pub token_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// Defaulting policy for the environment form.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnvironmentSettings {
    pub domain_suffix: String,
    pub addon_repository_prefix: String,
    /// Treat an empty addon list as a submission error instead of a warning.
    pub require_customer_addons: bool,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            domain_suffix: "erp.mmiao.net".to_string(),
            addon_repository_prefix: "git@github.com:ShanghaiMeowAI/".to_string(),
            require_customer_addons: false,
        }
    }
}

/// Global configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub environment: EnvironmentSettings,
}

impl Config {
    /// Load built-in defaults, then `opsconsole.toml`, then `OPSCONSOLE_*`
    /// environment variables (`OPSCONSOLE_API__BASE_URL=...`).
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = EnvironmentSettings::default();
        let settings = config::Config::builder()
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("session.token_dir", default_token_dir().to_string_lossy().to_string())?
            .set_default("session.token_key", "token")?
            .set_default("logging.level", "info")?
            .set_default("environment.domain_suffix", defaults.domain_suffix)?
            .set_default("environment.addon_repository_prefix", defaults.addon_repository_prefix)?
            .set_default("environment.require_customer_addons", defaults.require_customer_addons)?
            .add_source(config::File::with_name("opsconsole").required(false))
            .add_source(
                config::Environment::with_prefix("OPSCONSOLE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        Ok(cfg)
    }
}

/// ~/.opsconsole, falling back to the working directory.
fn default_token_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".opsconsole")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let cfg = Config::from_env().unwrap();
        assert!(!cfg.api.base_url.is_empty());
        assert_eq!(cfg.session.token_key, "token");
        assert!(cfg.session.token_dir.ends_with(".opsconsole"));
    }

    #[test]
    fn test_token_dir_under_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(default_token_dir(), home.join(".opsconsole"));
        }
    }

    #[test]
    fn test_environment_defaults() {
        let settings = EnvironmentSettings::default();
        assert_eq!(settings.domain_suffix, "erp.mmiao.net");
        assert!(!settings.require_customer_addons);
    }
}
