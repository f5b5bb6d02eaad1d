use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the scrub handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account_url: String,

    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub vault_id: String,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_table")]
    pub table: String,

    /// Column holding the original file
    #[serde(default = "default_file_column")]
    pub file_column: String,

    /// Multipart field name for the redacted upload
    #[serde(default = "default_upload_field")]
    pub upload_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account_url: String::new(),
            account_id: String::new(),
            vault_id: String::new(),
            vault: VaultConfig::default(),
            poll: PollConfig::default(),
            http: HttpConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            file_column: default_file_column(),
            upload_field: default_upload_field(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_table() -> String {
    "evidence".to_string()
}

fn default_file_column() -> String {
    "original_file".to_string()
}

fn default_upload_field() -> String {
    "processed_file".to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("scrub/{}", env!("CARGO_PKG_VERSION"))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    17480
}

impl PollConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load config from `path`, or the default location if it exists,
    /// then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env_with(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Override account settings from the runtime environment. Both the
    /// lower-case names the serverless runtime exposes and `SCRUB_*`
    /// names are accepted; a non-empty `SCRUB_*` value wins and empty
    /// values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let pick = |plain: &str, prefixed: &str| non_empty(prefixed).or_else(|| non_empty(plain));

        if let Some(v) = pick("account_url", "SCRUB_ACCOUNT_URL") {
            self.account_url = v;
        }
        if let Some(v) = pick("account_id", "SCRUB_ACCOUNT_ID") {
            self.account_id = v;
        }
        if let Some(v) = pick("vault_id", "SCRUB_VAULT_ID") {
            self.vault_id = v;
        }
    }

    pub fn validate(&mut self) -> anyhow::Result<()> {
        let trimmed = self.account_url.trim_end_matches('/').len();
        self.account_url.truncate(trimmed);

        let missing: Vec<&str> = [
            ("account_url", &self.account_url),
            ("account_id", &self.account_id),
            ("vault_id", &self.vault_id),
        ]
        .iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            anyhow::bail!("Missing required config: {}", missing.join(", "));
        }
        if self.poll.max_attempts == 0 {
            anyhow::bail!("poll.max_attempts must be at least 1");
        }
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "scrub", "scrub") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.scrub/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> Config {
        Config {
            account_url: "https://acct.vault.example.com/".to_string(),
            account_id: "acc".to_string(),
            vault_id: "v1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.vault.table, "evidence");
        assert_eq!(config.vault.file_column, "original_file");
        assert_eq!(config.poll.delay(), Duration::from_millis(1000));
        assert_eq!(config.poll.max_attempts, 300);
        assert_eq!(config.server.port, 17480);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
account_url = "https://acct.example.com"
account_id = "acc"
vault_id = "v1"

[poll]
delay_ms = 250

[vault]
table = "cases"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.vault_id, "v1");
        assert_eq!(config.poll.delay_ms, 250);
        assert_eq!(config.poll.max_attempts, 300);
        assert_eq!(config.vault.table, "cases");
        assert_eq!(config.vault.upload_field, "processed_file");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "account_id = \"acc\"\n[http]\ntimeout_secs = 5\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.account_id, "acc");
        assert_eq!(config.http.timeout(), Duration::from_secs(5));

        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("account_url", "https://runtime.example.com"),
            ("vault_id", "from-runtime"),
            ("SCRUB_VAULT_ID", "from-scrub"),
            ("account_id", ""),
        ]
        .into_iter()
        .collect();

        let mut config = complete();
        config.apply_env_with(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.account_url, "https://runtime.example.com");
        assert_eq!(config.vault_id, "from-scrub");
        assert_eq!(config.account_id, "acc");
    }

    #[test]
    fn test_empty_prefixed_env_falls_back_to_runtime_name() {
        let env: HashMap<&str, &str> = [
            ("SCRUB_VAULT_ID", ""),
            ("vault_id", "from-runtime"),
            ("SCRUB_ACCOUNT_ID", ""),
        ]
        .into_iter()
        .collect();

        let mut config = complete();
        config.apply_env_with(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.vault_id, "from-runtime");
        assert_eq!(config.account_id, "acc");
    }

    #[test]
    fn test_validate_trims_url() {
        let mut config = complete();
        config.validate().unwrap();
        assert_eq!(config.account_url, "https://acct.vault.example.com");
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let mut config = Config::default();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("account_url"));
        assert!(err.contains("vault_id"));

        let mut config = complete();
        config.poll.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
