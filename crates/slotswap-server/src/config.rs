use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Mutating requests allowed per actor per window.
    pub write_limit: u32,
    /// Read requests allowed per actor per window.
    pub read_limit: u32,
    /// Registrations allowed per client IP per window.
    pub register_limit: u32,
    pub rate_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            write_limit: 5,
            read_limit: 30,
            register_limit: 3,
            rate_window: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let listen_addr = match lookup("SLOTSWAP_LISTEN_ADDR") {
            Some(raw) => raw.parse().map_err(|_| {
                ConfigError::Invalid("SLOTSWAP_LISTEN_ADDR", "must be a valid socket address")
            })?,
            None => defaults.listen_addr,
        };

        let write_limit = parse_positive(&lookup, "SLOTSWAP_WRITE_LIMIT", defaults.write_limit)?;
        let read_limit = parse_positive(&lookup, "SLOTSWAP_READ_LIMIT", defaults.read_limit)?;
        let register_limit =
            parse_positive(&lookup, "SLOTSWAP_REGISTER_LIMIT", defaults.register_limit)?;
        let window_secs = parse_positive(&lookup, "SLOTSWAP_RATE_WINDOW_SECS", 1)?;

        Ok(Config {
            listen_addr,
            write_limit,
            read_limit,
            register_limit,
            rate_window: Duration::from_secs(u64::from(window_secs)),
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u32,
) -> Result<u32, ConfigError> {
    match lookup(var) {
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid(var, "must be a positive integer")),
        },
        None => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
