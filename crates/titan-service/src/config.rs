//! # Service Configuration
//!
//! Environment-based configuration for the use-case layer and `titan-ops`.

use std::env;
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Logging level, used when `RUST_LOG` is unset
    pub log_level: String,

    /// Logging output format
    pub log_format: LogFormat,

    /// Buffer size of the domain event broadcast channel
    pub event_channel_capacity: usize,

    /// Reload-and-retry attempts after an optimistic write conflict
    pub write_retry_limit: u32,

    /// Page size used when a listing request gives none
    pub default_page_size: u32,

    /// Upper bound on any requested page size
    pub max_page_size: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("pretty" | "text") => LogFormat::Pretty,
                _ => LogFormat::Json,
            },

            event_channel_capacity: parsed(&lookup, "EVENT_CHANNEL_CAPACITY")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(1024),

            write_retry_limit: parsed(&lookup, "WRITE_RETRY_LIMIT").unwrap_or(3),

            default_page_size: parsed(&lookup, "DEFAULT_PAGE_SIZE")
                .filter(|&n: &u32| n > 0)
                .unwrap_or(10),

            max_page_size: parsed(&lookup, "MAX_PAGE_SIZE")
                .filter(|&n: &u32| n > 0)
                .unwrap_or(100),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.log_level, "info");
        assert_eq!(c.log_format, LogFormat::Json);
        assert_eq!(c.event_channel_capacity, 1024);
        assert_eq!(c.write_retry_limit, 3);
        assert_eq!(c.default_page_size, 10);
        assert_eq!(c.max_page_size, 100);
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "pretty"),
            ("EVENT_CHANNEL_CAPACITY", "16"),
            ("WRITE_RETRY_LIMIT", "0"),
            ("DEFAULT_PAGE_SIZE", "25"),
        ]);
        assert_eq!(c.log_level, "debug");
        assert_eq!(c.log_format, LogFormat::Pretty);
        assert_eq!(c.event_channel_capacity, 16);
        assert_eq!(c.write_retry_limit, 0);
        assert_eq!(c.default_page_size, 25);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let c = config(&[
            ("EVENT_CHANNEL_CAPACITY", "0"),
            ("WRITE_RETRY_LIMIT", "lots"),
            ("MAX_PAGE_SIZE", "-4"),
        ]);
        assert_eq!(c.event_channel_capacity, 1024);
        assert_eq!(c.write_retry_limit, 3);
        assert_eq!(c.max_page_size, 100);
    }
}
