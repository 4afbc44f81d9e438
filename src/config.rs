use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_COMMAND_PREFIX: &str = "/mcinfo";

/// Everything the service reads from its environment at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `PORT`
    pub port: u16,
    /// `QUERY_TIMEOUT_MS`, applied to every step of a query.
    pub query_timeout: Duration,
    /// `COMMAND_PREFIX`
    pub command_prefix: String,
    /// `LOG_FORMAT`
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("`{name}` must be {expected}, got {value:?}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
    expected: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_owned(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| ConfigError {
                name: "PORT",
                value: port,
                expected: "a port number",
            })?;
        }
        if let Some(timeout) = lookup("QUERY_TIMEOUT_MS") {
            config.query_timeout = match timeout.parse::<u64>() {
                Ok(millis) if millis > 0 => Duration::from_millis(millis),
                _ => {
                    return Err(ConfigError {
                        name: "QUERY_TIMEOUT_MS",
                        value: timeout,
                        expected: "a positive number of milliseconds",
                    })
                }
            };
        }
        if let Some(prefix) = lookup("COMMAND_PREFIX") {
            if prefix.trim().is_empty() {
                return Err(ConfigError {
                    name: "COMMAND_PREFIX",
                    value: prefix,
                    expected: "non-empty",
                });
            }
            config.command_prefix = prefix;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError {
                        name: "LOG_FORMAT",
                        value: format,
                        expected: "`pretty` or `json`",
                    })
                }
            };
        }
        Ok(config)
    }
}
