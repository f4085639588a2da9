//! Server configuration

use crate::cli::Cli;
use anyhow::Context;
use modguard_alerts::AlertsConfig;
use modguard_classifiers::ChatClientConfig;
use modguard_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration, loaded from YAML with CLI overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub alerts: AlertsConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Skip outbound URL validation (development only)
    #[serde(default)]
    pub allow_insecure_endpoints: bool,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path))?;
            Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))?
        } else {
            Self::default()
        };

        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Apply CLI and environment overrides
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(url) = &cli.database_url {
            self.database.url = url.clone();
        }
        if let Some(key) = &cli.classifier_api_key {
            self.classifier.api_key = Some(key.clone());
        }
        if let Some(url) = &cli.slack_webhook_url {
            self.alerts.slack_webhook_url = Some(url.clone());
        }
        if let Some(key) = &cli.brevo_api_key {
            self.alerts.brevo_api_key = Some(key.clone());
        }
        if let Some(sender) = &cli.brevo_sender {
            self.alerts.brevo_sender = Some(sender.clone());
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            database: DatabaseConfig::default(),
            classifier: ClassifierConfig::default(),
            alerts: AlertsConfig::default(),
            engine: EngineConfig::default(),
            body_limit_bytes: default_body_limit(),
            allow_insecure_endpoints: false,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Remote classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Chat-completions API base URL
    #[serde(default = "default_classifier_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout (seconds)
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,

    /// Usually supplied through the environment rather than the file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_classifier_url(),
            model: default_model(),
            timeout_secs: default_classifier_timeout(),
            api_key: None,
        }
    }
}

impl ClassifierConfig {
    pub fn to_client_config(&self) -> ChatClientConfig {
        ChatClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_database_url() -> String {
    "sqlite://modguard.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_classifier_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_model() -> String {
    "sonar-pro".to_string()
}

fn default_classifier_timeout() -> u64 {
    30
}
