use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_VISION_API_URL: &str = "https://vision.googleapis.com";
pub const DEFAULT_SPOONACULAR_API_URL: &str = "https://api.spoonacular.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerMode {
    /// Real label and nutrition services.
    Live,
    /// Canned banana analysis, no credentials needed.
    Demo,
}

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: AnalyzerMode,
    pub bind_addr: SocketAddr,
    pub vision_api_key: Option<String>,
    pub spoonacular_api_key: Option<String>,
    pub vision_api_url: String,
    pub spoonacular_api_url: String,
    pub http_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mode = match get("ANALYZER_MODE").as_deref() {
            None => AnalyzerMode::Live,
            Some(m) if m.eq_ignore_ascii_case("live") => AnalyzerMode::Live,
            Some(m) if m.eq_ignore_ascii_case("demo") => AnalyzerMode::Demo,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "ANALYZER_MODE",
                    expected: "'live' or 'demo'",
                    value: other.to_string(),
                })
            }
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            expected: "a socket address like 0.0.0.0:3000",
            value: bind_raw.clone(),
        })?;

        let http_timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or(
                ConfigError::Invalid {
                    name: "HTTP_TIMEOUT_SECS",
                    expected: "a positive number of seconds",
                    value: raw,
                },
            )?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().ok().filter(|b| *b > 0).ok_or(
                ConfigError::Invalid {
                    name: "MAX_UPLOAD_BYTES",
                    expected: "a positive byte count",
                    value: raw,
                },
            )?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            mode,
            bind_addr,
            vision_api_key: get("GOOGLE_VISION_API_KEY"),
            spoonacular_api_key: get("SPOONACULAR_API_KEY"),
            vision_api_url: get("VISION_API_URL")
                .unwrap_or_else(|| DEFAULT_VISION_API_URL.to_string()),
            spoonacular_api_url: get("SPOONACULAR_API_URL")
                .unwrap_or_else(|| DEFAULT_SPOONACULAR_API_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            max_upload_bytes,
        })
    }

    /// Names of credentials live mode needs but does not have.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        if self.mode == AnalyzerMode::Demo {
            return Vec::new();
        }

        let mut missing = Vec::new();
        if self.vision_api_key.is_none() {
            missing.push("GOOGLE_VISION_API_KEY");
        }
        if self.spoonacular_api_key.is_none() {
            missing.push("SPOONACULAR_API_KEY");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.mode, AnalyzerMode::Live);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.vision_api_url, DEFAULT_VISION_API_URL);
        assert_eq!(config.spoonacular_api_url, DEFAULT_SPOONACULAR_API_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(
            config.missing_credentials(),
            vec!["GOOGLE_VISION_API_KEY", "SPOONACULAR_API_KEY"]
        );
    }

    #[test]
    fn test_all_vars() {
        let config = config_from(&[
            ("ANALYZER_MODE", "LIVE"),
            ("BIND_ADDR", "127.0.0.1:8081"),
            ("GOOGLE_VISION_API_KEY", "vision-key"),
            ("SPOONACULAR_API_KEY", "spoon-key"),
            ("VISION_API_URL", "http://localhost:9000"),
            ("SPOONACULAR_API_URL", "http://localhost:9001"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("MAX_UPLOAD_BYTES", "2048"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8081");
        assert_eq!(config.vision_api_key.as_deref(), Some("vision-key"));
        assert_eq!(config.spoonacular_api_key.as_deref(), Some("spoon-key"));
        assert_eq!(config.vision_api_url, "http://localhost:9000");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.max_upload_bytes, 2048);
        assert!(config.missing_credentials().is_empty());
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let config = config_from(&[
            ("GOOGLE_VISION_API_KEY", "   "),
            ("SPOONACULAR_API_KEY", "spoon-key"),
        ])
        .unwrap();

        assert_eq!(config.missing_credentials(), vec!["GOOGLE_VISION_API_KEY"]);
    }

    #[test]
    fn test_demo_mode_needs_no_credentials() {
        let config = config_from(&[("ANALYZER_MODE", "demo")]).unwrap();
        assert_eq!(config.mode, AnalyzerMode::Demo);
        assert!(config.missing_credentials().is_empty());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("ANALYZER_MODE", "offline")]),
            Err(ConfigError::Invalid { name: "ANALYZER_MODE", .. })
        ));
        assert!(matches!(
            config_from(&[("HTTP_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid { name: "HTTP_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            config_from(&[("MAX_UPLOAD_BYTES", "lots")]),
            Err(ConfigError::Invalid { name: "MAX_UPLOAD_BYTES", .. })
        ));
        assert!(matches!(
            config_from(&[("BIND_ADDR", "localhost")]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
    }
}
