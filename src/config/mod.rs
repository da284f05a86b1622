use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::observability::LogFormat;

/// Dispatcher daemon configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "ardispatch")]
#[command(about = "Active-response dispatcher for intrusion-detection alerts")]
pub struct Config {
    /// HTTP server listen address.
    ///
    /// The API has no authentication and can trigger responses; keep it on loopback.
    #[arg(long, default_value = "127.0.0.1:55010", env = "ARD_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Path to the response policy YAML file
    #[arg(long, default_value = "ar.yaml", env = "ARD_POLICY_PATH")]
    pub policy_path: PathBuf,

    /// Extra ignore list, one address per line (optional, reloaded on change)
    #[arg(long, env = "ARD_IGNORE_PATH")]
    pub ignore_path: Option<PathBuf>,

    /// Socket of the local execution daemon
    #[arg(long, default_value = "/var/ossec/queue/alerts/execq", env = "ARD_EXEC_QUEUE")]
    pub exec_queue: PathBuf,

    /// Socket of the forwarding daemon
    #[arg(long, default_value = "/var/ossec/queue/alerts/ar", env = "ARD_FORWARD_QUEUE")]
    pub forward_queue: PathBuf,

    /// Give up on a queue write after this many milliseconds
    #[arg(long, default_value = "1000", env = "ARD_QUEUE_TIMEOUT_MS")]
    pub queue_timeout_ms: u64,

    /// Policy reload check interval in seconds
    #[arg(long, default_value = "30", env = "ARD_POLICY_RELOAD_SECS")]
    pub policy_reload_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "ARD_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "ARD_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,

    /// Per-request timeout for the HTTP API in seconds
    #[arg(long, default_value = "5", env = "ARD_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,
}

impl Config {
    /// Get policy reload interval as Duration.
    pub fn policy_reload_interval(&self) -> Duration {
        Duration::from_secs(self.policy_reload_secs)
    }

    /// Get queue write timeout as Duration.
    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }

    /// Get HTTP request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "127.0.0.1:55010".to_string(),
            policy_path: PathBuf::from("ar.yaml"),
            ignore_path: None,
            exec_queue: PathBuf::from("/var/ossec/queue/alerts/execq"),
            forward_queue: PathBuf::from("/var/ossec/queue/alerts/ar"),
            queue_timeout_ms: 1000,
            policy_reload_secs: 30,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            graceful_shutdown: true,
            request_timeout_secs: 5,
        }
    }
}
