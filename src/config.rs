//! TOML configuration.
//!
//! ```toml
//! [catalog]
//! dir = "./inventory"
//! extensions = ["xlsx", "xls", "csv"]
//!
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [quotes]
//! dir = "./quotes"
//!
//! [mail]
//! sender = "quotes@example.com"
//! ```
//!
//! Every section is optional. `[mail]` being absent disables delivery.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::tabular::SourceFormat;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
    #[serde(default)]
    pub mail: Option<MailConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Directory scanned for inventory files. Not recursive.
    #[serde(default = "default_catalog_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns matched against file names; matches are never opened.
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dir: default_catalog_dir(),
            extensions: default_extensions(),
            exclude_globs: default_exclude_globs(),
            follow_symlinks: false,
        }
    }
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    SourceFormat::ALL
        .iter()
        .map(|f| f.extension().to_string())
        .collect()
}

fn default_exclude_globs() -> Vec<String> {
    // Office and LibreOffice lock files.
    vec!["~$*".to_string(), ".~lock*".to_string()]
}

impl CatalogConfig {
    /// Configured extensions resolved to formats, in configuration order.
    pub fn formats(&self) -> Vec<SourceFormat> {
        let mut formats = Vec::new();
        for format in self
            .extensions
            .iter()
            .filter_map(|e| SourceFormat::from_extension(e))
        {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuotesConfig {
    /// Directory rendered quotation PDFs are written to and sent from.
    #[serde(default = "default_quotes_dir")]
    pub dir: PathBuf,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            dir: default_quotes_dir(),
        }
    }
}

fn default_quotes_dir() -> PathBuf {
    PathBuf::from("./quotes")
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub sender: String,
    /// SMTP login; defaults to `sender`.
    #[serde(default)]
    pub username: Option<String>,
    /// Name of the environment variable holding the SMTP password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
fn default_smtp_port() -> u16 {
    465
}
fn default_password_env() -> String {
    "QUOTER_SMTP_PASSWORD".to_string()
}

impl MailConfig {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.sender)
    }

    pub fn password(&self) -> Result<String> {
        std::env::var(&self.password_env)
            .with_context(|| format!("SMTP password variable {} is not set", self.password_env))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults for every section: current directory, all formats, no mail.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

fn validate(config: &Config) -> Result<()> {
    if config.catalog.extensions.is_empty() {
        bail!("catalog.extensions must list at least one extension");
    }
    for ext in &config.catalog.extensions {
        if SourceFormat::from_extension(ext).is_none() {
            bail!(
                "Unknown catalog extension: '{}'. Must be xlsx, xls, or csv.",
                ext
            );
        }
    }

    if config.server.bind.trim().is_empty() {
        bail!("server.bind must not be empty");
    }

    if let Some(mail) = &config.mail {
        if mail.sender.trim().is_empty() {
            bail!("mail.sender must not be empty");
        }
        if mail.smtp_port == 0 {
            bail!("mail.smtp_port must be > 0");
        }
    }

    Ok(())
}
