use crate::error::{Error, Result};
use crate::rate_limiter::RateLimitSettings;
use crate::validation::PageLimits;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Service configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Sliding-window quota for the one-minute window
    pub requests_per_minute: u32,
    /// Sliding-window quota for the one-hour window
    pub requests_per_hour: u32,
    /// Admit requests when the counter store cannot record them
    pub admission_fail_open: bool,
    /// Page size applied when the caller does not ask for one
    pub default_page_size: usize,
    /// Hard ceiling for requested page sizes
    pub max_page_size: usize,
    /// Seconds between counter-log pruning runs
    pub cleanup_interval_secs: u64,
    /// Optional JSON data file with tenants and employees
    pub directory_file: Option<PathBuf>,
    /// Default log level for the env filter
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 3000).into(),
            requests_per_minute: 60,
            requests_per_hour: 1000,
            admission_fail_open: false,
            default_page_size: 50,
            max_page_size: 100,
            cleanup_interval_secs: 300,
            directory_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();
        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            requests_per_minute: parse_var(
                "RATE_LIMIT_REQUESTS_PER_MINUTE",
                defaults.requests_per_minute,
            )?,
            requests_per_hour: parse_var(
                "RATE_LIMIT_REQUESTS_PER_HOUR",
                defaults.requests_per_hour,
            )?,
            admission_fail_open: parse_var("ADMISSION_FAIL_OPEN", defaults.admission_fail_open)?,
            default_page_size: parse_var("DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_var("MAX_PAGE_SIZE", defaults.max_page_size)?,
            cleanup_interval_secs: parse_var("CLEANUP_INTERVAL", defaults.cleanup_interval_secs)?,
            directory_file: std::env::var("DIRECTORY_FILE").ok().map(PathBuf::from),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    pub fn rate_limit_settings(&self) -> RateLimitSettings {
        let mut settings =
            RateLimitSettings::new(self.requests_per_minute, self.requests_per_hour);
        settings.fail_open = self.admission_fail_open;
        settings
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::InvalidInput(format!("invalid value for {}: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
