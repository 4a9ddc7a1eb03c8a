//! Environment-driven runtime configuration.

use std::env;
use std::error::Error;
use std::fmt;

use dispatch_core::geohash::{Codec, DEFAULT_PRECISION, MAX_PRECISION};

/// In-flight delivery ceiling used when the deployment does not set one.
pub const DEFAULT_FANOUT_CONCURRENCY: usize = 8;

#[cfg(feature = "external-codec")]
const CODEC_CHOICES: &str = "builtin or library";
#[cfg(not(feature = "external-codec"))]
const CODEC_CHOICES: &str = "builtin (the library codec is not compiled in)";

/// Settings for the message router, read once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub drivers_table: String,
    pub connections_table: String,
    pub messages_table: String,
    pub websocket_endpoint: String,
    pub geohash_precision: usize,
    pub fanout_concurrency: usize,
    pub codec: Codec,
}

/// A missing or unusable environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing {
        key: &'static str,
    },
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => {
                write!(f, "required environment variable {key} is not set")
            }
            Self::Invalid {
                key,
                value,
                expected,
            } => {
                write!(
                    f,
                    "environment variable {key} has invalid value {value:?}, expected {expected}"
                )
            }
        }
    }
}

impl Error for ConfigError {}

impl Config {
    /// Reads the full router configuration. `WEBSOCKET_ENDPOINT` has no
    /// sensible default and must be present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let geohash_precision = match optional_env("GEOHASH_PRECISION") {
            Some(value) => parse_precision(&value)?,
            None => DEFAULT_PRECISION,
        };
        let fanout_concurrency = match optional_env("FANOUT_CONCURRENCY") {
            Some(value) => parse_concurrency(&value)?,
            None => DEFAULT_FANOUT_CONCURRENCY,
        };
        let codec = match optional_env("GEOHASH_CODEC") {
            Some(value) => parse_codec(&value)?,
            None => Codec::Builtin,
        };

        Ok(Self {
            drivers_table: optional_env("DRIVERS_TABLE")
                .unwrap_or_else(|| "DriversTable".to_string()),
            connections_table: connections_table_from_env(),
            messages_table: optional_env("MESSAGES_TABLE")
                .unwrap_or_else(|| "MessagesTable".to_string()),
            websocket_endpoint: optional_env("WEBSOCKET_ENDPOINT").ok_or(ConfigError::Missing {
                key: "WEBSOCKET_ENDPOINT",
            })?,
            geohash_precision,
            fanout_concurrency,
            codec,
        })
    }
}

/// The connect and disconnect lambdas only touch the connections table and
/// do not need the rest of the router settings.
pub fn connections_table_from_env() -> String {
    optional_env("CONNECTIONS_TABLE").unwrap_or_else(|| "ConnectionsTable".to_string())
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_precision(value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|precision| (1..=MAX_PRECISION).contains(precision))
        .ok_or_else(|| ConfigError::Invalid {
            key: "GEOHASH_PRECISION",
            value: value.to_string(),
            expected: "an integer between 1 and 12",
        })
}

fn parse_concurrency(value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|limit| *limit >= 1)
        .ok_or_else(|| ConfigError::Invalid {
            key: "FANOUT_CONCURRENCY",
            value: value.to_string(),
            expected: "an integer of at least 1",
        })
}

fn parse_codec(value: &str) -> Result<Codec, ConfigError> {
    match value.trim() {
        "builtin" => Ok(Codec::Builtin),
        #[cfg(feature = "external-codec")]
        "library" => Ok(Codec::Library),
        _ => Err(ConfigError::Invalid {
            key: "GEOHASH_CODEC",
            value: value.to_string(),
            expected: CODEC_CHOICES,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_must_stay_within_the_codec_range() {
        assert_eq!(parse_precision("7").expect("parse"), 7);
        assert_eq!(parse_precision(" 12 ").expect("parse"), 12);
        assert!(parse_precision("0").is_err());
        assert!(parse_precision("13").is_err());
        assert!(parse_precision("five").is_err());
    }

    #[test]
    fn concurrency_must_be_at_least_one() {
        assert_eq!(parse_concurrency("16").expect("parse"), 16);
        assert!(parse_concurrency("0").is_err());
        assert!(parse_concurrency("-3").is_err());
    }

    #[test]
    fn codec_names_map_to_implementations() {
        assert_eq!(parse_codec("builtin").expect("parse"), Codec::Builtin);
        assert!(parse_codec("bisection").is_err());
    }

    #[cfg(feature = "external-codec")]
    #[test]
    fn library_codec_is_selectable_when_compiled_in() {
        assert_eq!(parse_codec("library").expect("parse"), Codec::Library);
    }

    #[test]
    fn invalid_values_name_the_offending_variable() {
        let error = parse_precision("99").expect_err("reject");
        assert!(error.to_string().contains("GEOHASH_PRECISION"));
        assert!(error.to_string().contains("99"));
    }
}
