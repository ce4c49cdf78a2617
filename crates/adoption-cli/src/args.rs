use adoption_acquire::client::DEFAULT_USER_AGENT;
use adoption_acquire::{ClientConfig, Fetcher};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Log level: error, warn, info, debug, trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive for this level. Debug and trace keep the HTML
    /// parser crates quiet.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
            LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
        }
    }
}

/// Flags every scraper binary accepts.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Log level (RUST_LOG, when set, takes precedence)
    #[arg(long, default_value = "info", value_enum)]
    pub log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Directory for the append-only log file
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Pause before each request, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

impl CommonArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout: Duration::from_secs(self.timeout_secs),
            delay: Duration::from_millis(self.delay_ms),
            ..ClientConfig::default()
        }
    }

    /// Build the run's single HTTP client.
    pub fn fetcher(&self) -> Result<Arc<Fetcher>> {
        Ok(Arc::new(Fetcher::new(&self.client_config())?))
    }

    /// Install console + file logging for the binary `app`.
    pub fn init_logging(&self, app: &str) -> Result<PathBuf> {
        crate::logging::init(self.log_level, self.utc, &self.log_dir, app)
    }
}
