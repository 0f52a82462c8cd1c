//! Configuration management for the assistant
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/edp-assistant/config.toml

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{AssistantError, Result};

/// Main configuration for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bedrock runtime configuration
    pub bedrock: BedrockConfig,
    /// Model configuration
    pub models: ModelConfig,
    /// Agent loop configuration
    pub agent: AgentConfig,
    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,
}

/// Bedrock runtime endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockConfig {
    /// AWS region hosting the runtime endpoint
    pub region: String,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds
    pub read_timeout_secs: u64,
    /// Maximum simultaneous outbound inference requests, system-wide
    pub max_concurrent_requests: usize,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Alias of the chat model driving the conversation loop
    pub default: String,
    /// Bedrock model id used by the code generator tool
    pub code_generator: String,
    /// Alias -> Bedrock model id table
    #[serde(default = "default_model_table")]
    pub aliases: HashMap<String, String>,
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step budget for one run: model/tool round-trips before forced stop
    /// Default: 10
    pub max_steps: usize,
    /// Per-tool-call timeout in seconds
    /// Default: 10
    pub tool_timeout_secs: u64,
    /// Whether to show debug output
    pub debug: bool,
    /// Override for the built-in system instructions
    pub system_prompt: Option<String>,
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum results returned per query
    pub max_results: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

fn default_model_table() -> HashMap<String, String> {
    HashMap::from([(
        "claude-3-5-sonnet".to_string(),
        "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string(),
    )])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bedrock: BedrockConfig::default(),
            models: ModelConfig::default(),
            agent: AgentConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".to_string()),
            connect_timeout_secs: 5,
            read_timeout_secs: 30,
            max_concurrent_requests: 5,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default: env::var("EDPA_DEFAULT_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet".to_string()),
            code_generator: env::var("EDPA_CODEGEN_MODEL")
                .unwrap_or_else(|_| "anthropic.claude-3-5-sonnet-20241022-v2:0".to_string()),
            aliases: default_model_table(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            tool_timeout_secs: 10,
            debug: env::var("EDPA_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            system_prompt: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("edp-assistant")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(AssistantError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| AssistantError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| AssistantError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                AssistantError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AssistantError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| AssistantError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the Bedrock runtime endpoint URL
    pub fn runtime_endpoint(&self) -> String {
        format!("https://bedrock-runtime.{}.amazonaws.com", self.bedrock.region)
    }

    /// Resolve a model alias against the alias table
    pub fn resolve_model(&self, alias: &str) -> Result<String> {
        self.models
            .aliases
            .get(alias)
            .cloned()
            .ok_or_else(|| AssistantError::UnknownModel(alias.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.models.default, "claude-3-5-sonnet");
        assert_eq!(config.agent.max_steps, 10);
        assert_eq!(config.agent.tool_timeout_secs, 10);
        assert_eq!(config.bedrock.max_concurrent_requests, 5);
        assert_eq!(config.search.max_results, 3);
    }

    #[test]
    fn test_runtime_endpoint() {
        let mut config = Config::default();
        config.bedrock.region = "us-west-2".to_string();
        assert_eq!(
            config.runtime_endpoint(),
            "https://bedrock-runtime.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn test_resolve_model() {
        let config = Config::default();
        assert_eq!(
            config.resolve_model("claude-3-5-sonnet").unwrap(),
            "anthropic.claude-3-5-sonnet-20240620-v1:0"
        );
        assert!(matches!(
            config.resolve_model("nope"),
            Err(AssistantError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("max_steps"));
        assert!(toml_str.contains("code_generator"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.models.default, config.models.default);
    }
}
