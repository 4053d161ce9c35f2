//! Server configuration, parsed from command-line arguments.

use crate::{DEFAULT_HOST, DEFAULT_PORT};
use std::time::Duration;
use thiserror::Error;

/// Default base interval for the expiry sweeper, in milliseconds
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 100;

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors produced while parsing the command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base sweep interval; `None` disables the sweeper
    pub sweep_interval: Option<Duration>,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(Config),
    Help,
    Version,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sweep_interval: Some(Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS)),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Parses arguments, not including the program name.
    pub fn parse_from<I>(args: I) -> Result<CliAction, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => {
                    config.host = next_value(&mut args, &arg)?;
                }
                "--port" | "-p" => {
                    let value = next_value(&mut args, &arg)?;
                    config.port = parse_value(&arg, value)?;
                }
                "--sweep-interval-ms" => {
                    let value = next_value(&mut args, &arg)?;
                    let ms: u64 = parse_value(&arg, value)?;
                    config.sweep_interval = (ms > 0).then(|| Duration::from_millis(ms));
                }
                "--log-level" => {
                    config.log_level = next_value(&mut args, &arg)?;
                }
                "--help" => return Ok(CliAction::Help),
                "--version" | "-v" => return Ok(CliAction::Version),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(CliAction::Run(config))
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value,
    })
}

/// Usage text for `--help`.
pub fn help_text() -> String {
    format!(
        r#"
emberkv - In-Memory Key-Value Server

USAGE:
    emberkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>              Host to bind to (default: {host})
    -p, --port <PORT>              Port to listen on (default: {port})
        --sweep-interval-ms <MS>   Base expiry sweep interval, 0 disables (default: {sweep})
        --log-level <LEVEL>        Log filter when RUST_LOG is unset (default: {level})
    -v, --version                  Print version information
        --help                     Print this help message

CONNECTING:
    $ redis-cli -p {port}
    127.0.0.1:{port}> SET name "Ariz" PX 5000
    OK
    127.0.0.1:{port}> GET name
    "Ariz"
"#,
        host = DEFAULT_HOST,
        port = DEFAULT_PORT,
        sweep = DEFAULT_SWEEP_INTERVAL_MS,
        level = DEFAULT_LOG_LEVEL,
    )
}
