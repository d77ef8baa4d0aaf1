use std::time::Duration;

use ticket_printer::{Charset, ConnectionOptions};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | DATA_FILE | ./data/pos.json | JSON store file |
/// | LOG_LEVEL | info | log level |
/// | LOG_DIR | unset | directory for rolling log files |
/// | PRINTER_CONNECT_TIMEOUT_MS | 5000 | system queue liveness bound |
/// | PRINTER_USB_TIMEOUT_MS | 3000 | USB open and write bound |
/// | PRINTER_DETECT_TIMEOUT_MS | 5000 | per-source detection bound |
/// | PRINTER_CHARSET | WPC1252 | printer character set |
///
/// ```ignore
/// HTTP_PORT=8080 PRINTER_CHARSET=WPC1250 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// JSON store file
    pub data_file: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub connect_timeout_ms: u64,
    pub usb_timeout_ms: u64,
    pub detect_timeout_ms: u64,
    pub charset: Charset,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = ConnectionOptions::default();
        Self {
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            data_file: std::env::var("DATA_FILE").unwrap_or_else(|_| "./data/pos.json".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            connect_timeout_ms: env_parse("PRINTER_CONNECT_TIMEOUT_MS")
                .unwrap_or(millis(defaults.connect_timeout)),
            usb_timeout_ms: env_parse("PRINTER_USB_TIMEOUT_MS")
                .unwrap_or(millis(defaults.usb_timeout)),
            detect_timeout_ms: env_parse("PRINTER_DETECT_TIMEOUT_MS")
                .unwrap_or(millis(defaults.detect_timeout)),
            charset: std::env::var("PRINTER_CHARSET")
                .ok()
                .and_then(|name| {
                    let charset = Charset::from_name(&name);
                    if charset.is_none() {
                        tracing::warn!(charset = %name, "Unknown printer charset, using default");
                    }
                    charset
                })
                .unwrap_or_default(),
        }
    }

    /// Override the store location and port
    ///
    /// Used by tests
    pub fn with_overrides(data_file: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_file = data_file.into();
        config.http_port = http_port;
        config
    }

    /// Timeouts handed to the printer core
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            usb_timeout: Duration::from_millis(self.usb_timeout_ms),
            detect_timeout: Duration::from_millis(self.detect_timeout_ms),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}
