//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once to
//! decide where they go.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Event target that gets the configured level; everything else is capped at
/// `warn`.
const CRATE_TARGET: &str = "ontology_terms";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "compact")]
    #[default]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

/// Logger section of the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: Format,
    /// Full `EnvFilter` directive replacing the level based one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_filter: Option<String>,
}

fn default_enable() -> bool {
    true
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            enable: default_enable(),
            level: LogLevel::default(),
            format: Format::default(),
            override_filter: None,
        }
    }
}

impl LoggerSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        self.override_filter.clone().unwrap_or_else(|| {
            let global = match self.level {
                LogLevel::Off | LogLevel::Error => self.level,
                _ => LogLevel::Warn,
            };
            format!("{global},{CRATE_TARGET}={}", self.level)
        })
    }
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this when a
/// subscriber is already installed (for example from a test harness) is a
/// no-op.
pub fn init(config: &LoggerSettings) {
    if !config.enable {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directive()))
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().to_string()));

    let layer = match config.format {
        Format::Compact => fmt::layer().compact().with_ansi(true).boxed(),
        Format::Pretty => fmt::layer().pretty().with_ansi(true).boxed(),
        Format::Json => fmt::layer().json().with_ansi(false).boxed(),
    };

    if tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
