//! Daemon configuration
//!
//! Layered with the `config` crate: an optional TOML file, overridden by
//! environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `CONTACT_MAILER_CONFIG` | Config file path (default: `~/.contact-mailer/config.toml`) |
//! | `CONTACT_MAILER_CONTACT__RECIPIENTS` | Comma-separated list of addresses receiving submissions |
//! | `CONTACT_MAILER_MAIL__BACKEND` | `smtp` (default) or `console` |
//! | `CONTACT_MAILER_SMTP__HOST` | SMTP server hostname |
//! | `CONTACT_MAILER_SMTP__PORT` | Port (default: 587) |
//! | `CONTACT_MAILER_SMTP__TLS` | `starttls` (default), `tls`, or `none` |
//! | `CONTACT_MAILER_RPC__PORT` | JSON-RPC listen port (default: 9527) |
//! | `CONTACT_MAILER_LOG__FORMAT` | `pretty` (default) or `json` |
//!
//! Any other key follows the same `SECTION__FIELD` pattern.

use anyhow::{bail, Context, Result};
use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use contact_mailer_core::application::worker::constants::{
    DEFAULT_JOIN_TIMEOUT, DEFAULT_POLL_TIMEOUT,
};
use contact_mailer_infra_mail::SmtpConfig;
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "CONTACT_MAILER";
const CONFIG_PATH_VAR: &str = "CONTACT_MAILER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "~/.contact-mailer/config.toml";

/// Upper bound for every worker timeout setting
const MAX_WORKER_TIMEOUT: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Write daily-rolling log files here instead of stdout
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_host")]
    pub host: String,
    #[serde(default = "default_rpc_port")]
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: default_rpc_host(),
            port: default_rpc_port(),
        }
    }
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    9527
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    #[default]
    Smtp,
    Console,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub backend: MailBackend,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactConfig {
    /// Addresses that receive every contact form submission
    #[serde(default)]
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    #[serde(default = "default_join_timeout_secs")]
    pub join_timeout_secs: u64,
    /// Wait this long for the queue to drain before stopping the worker (0 = don't wait)
    #[serde(default)]
    pub drain_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
            join_timeout_secs: default_join_timeout_secs(),
            drain_timeout_secs: 0,
        }
    }
}

fn default_poll_timeout_ms() -> u64 {
    DEFAULT_POLL_TIMEOUT.as_millis() as u64
}

fn default_join_timeout_secs() -> u64 {
    DEFAULT_JOIN_TIMEOUT.as_secs()
}

impl WorkerConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        (self.drain_timeout_secs > 0).then(|| Duration::from_secs(self.drain_timeout_secs))
    }
}

impl AppConfig {
    /// Load from the config file (if present) and the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_CONFIG_PATH).into_owned());

        let config = Self::build(
            File::new(&path, FileFormat::Toml).required(false),
            environment(),
        )
        .with_context(|| format!("Failed to load configuration (file: {})", path))?;

        config.validate()?;
        Ok(config)
    }

    fn build(
        file: impl Source + Send + Sync + 'static,
        env: Environment,
    ) -> std::result::Result<Self, ConfigError> {
        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Reject configurations the daemon cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.contact.recipients.is_empty() {
            bail!("contact.recipients must list at least one address");
        }
        if self.mail.backend == MailBackend::Smtp && self.smtp.is_none() {
            bail!("mail.backend is smtp but no [smtp] section (smtp.host) is configured");
        }
        if self.worker.poll_timeout_ms == 0 {
            bail!("worker.poll_timeout_ms must be greater than zero");
        }

        let max_secs = MAX_WORKER_TIMEOUT.as_secs();
        if self.worker.poll_timeout_ms > max_secs * 1000 {
            bail!("worker.poll_timeout_ms must be at most {}", max_secs * 1000);
        }
        if self.worker.join_timeout_secs > max_secs {
            bail!("worker.join_timeout_secs must be at most {}", max_secs);
        }
        if self.worker.drain_timeout_secs > max_secs {
            bail!("worker.drain_timeout_secs must be at most {}", max_secs);
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("contact.recipients")
        .try_parsing(true)
}
