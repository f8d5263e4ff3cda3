use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Persona name handed to the model in the instructions.
    pub name: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            name: "EronAI".to_string(),
        }
    }
}

impl AssistantConfig {
    /// The configured key, else `$GEMINI_API_KEY`. Blank values count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub static_dir: String,
    /// Served for any path with no matching static file.
    pub index_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "127.0.0.1:3000".to_string(),
            static_dir: "public".to_string(),
            index_file: "ai-assistant.html".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn index_path(&self) -> PathBuf {
        Path::new(&self.static_dir).join(&self.index_file)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub currency: String,
    pub data_path: Option<String>,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "bizdash", "bizdash")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Directory holding the business collection keyspace.
    pub fn storage_path(&self) -> Result<PathBuf> {
        Ok(self.default_data_path()?.join("store"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization_with_defaults() {
        let config: AppConfig = serde_yaml::from_str(r#"currency: "MAD""#).unwrap();
        assert_eq!(config.currency, "MAD");
        assert!(config.data_path.is_none());
        assert_eq!(config.assistant, AssistantConfig::default());
        assert_eq!(config.assistant.model, "gemini-2.5-flash");
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert_eq!(
            config.server.index_path(),
            Path::new("public").join("ai-assistant.html")
        );
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "EUR"
data_path: "/tmp/bizdash"
assistant:
  base_url: "http://localhost:9000"
  api_key: "secret"
  name: "Ledger"
server:
  listen_addr: "0.0.0.0:8080"
  static_dir: "site"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.assistant.base_url, "http://localhost:9000");
        assert_eq!(config.assistant.model, "gemini-2.5-flash");
        assert_eq!(config.assistant.name, "Ledger");
        assert_eq!(config.assistant.resolve_api_key().as_deref(), Some("secret"));
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.server.index_file, "ai-assistant.html");
        assert_eq!(
            config.storage_path().unwrap(),
            PathBuf::from("/tmp/bizdash").join("store")
        );
    }

    #[test]
    fn test_config_requires_currency() {
        assert!(serde_yaml::from_str::<AppConfig>("data_path: /tmp").is_err());
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let assistant = AssistantConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        // A blank configured key does not fall through to the environment.
        assert_eq!(assistant.resolve_api_key(), None);
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "currency: MAD\n")?;
        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config.currency, "MAD");

        let missing = AppConfig::load_from_path("/nonexistent/bizdash.yaml");
        assert!(missing.unwrap_err().to_string().contains("Failed to read config file"));
        Ok(())
    }
}
