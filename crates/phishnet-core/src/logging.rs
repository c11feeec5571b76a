//! Structured logging initialization.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;

/// Verbosity accepted by [`init_logging`].
///
/// `warning` and `critical` are accepted as aliases of `warn` and `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "critical" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(value.to_owned())),
        }
    }
}

/// Installs a global fmt subscriber at `level`.
///
/// `RUST_LOG` wins over `level` when set. Calling this again after a
/// subscriber is installed is a no-op.
pub fn init_logging(level: &str) -> Result<LogLevel, ConfigError> {
    let level: LogLevel = level.parse()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();

    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive_with_aliases() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Critical".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!(" debug ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(LogLevel::default(), LogLevel::Warn);
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert_eq!(
            init_logging("loud"),
            Err(ConfigError::InvalidLogLevel(String::from("loud")))
        );
    }
}
