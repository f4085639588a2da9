//! Command-line interface

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "modguard-server")]
#[command(about = "ModGuard content moderation service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "modguard.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Database URL, e.g. sqlite://modguard.db
    #[arg(long, env = "MODGUARD_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Classifier API key
    #[arg(long, env = "MODGUARD_CLASSIFIER_API_KEY", hide_env_values = true)]
    pub classifier_api_key: Option<String>,

    /// Chat webhook URL for alerts
    #[arg(long, env = "MODGUARD_SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// Transactional e-mail API key
    #[arg(long, env = "MODGUARD_BREVO_API_KEY", hide_env_values = true)]
    pub brevo_api_key: Option<String>,

    /// Sender address for e-mail alerts
    #[arg(long, env = "MODGUARD_BREVO_SENDER")]
    pub brevo_sender: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}
