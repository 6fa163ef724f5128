//! Data models and configuration
//!
//! Defines the per-request caption input, the JSON bodies returned to callers,
//! and environment-driven service configuration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// One caption job: the uploaded image and the caller's keyword hints.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub keywords: Vec<String>,
}

impl CaptionRequest {
    pub fn new(image_bytes: Vec<u8>, mime_type: String, keywords: Vec<String>) -> Self {
        Self {
            image_bytes,
            mime_type,
            keywords,
        }
    }
}

/// Trim keyword hints and drop blank ones, keeping their order.
pub fn clean_keywords<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Body returned for captions, refusals and empty responses alike.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptionResponse {
    pub legenda: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key leaves the service running without a model.
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
    pub gemini_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_api_key: None,
            gemini_model: crate::ai::gemini::caption::DEFAULT_MODEL.to_string(),
            gemini_base_url: None,
            gemini_timeout: Duration::from_secs(60),
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            google_api_key: var("GOOGLE_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: var("GEMINI_BASE_URL"),
            gemini_timeout: match var("GEMINI_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse_var("GEMINI_TIMEOUT_SECS", &v)?),
                None => defaults.gemini_timeout,
            },
            host: var("HOST").unwrap_or(defaults.host),
            port: match var("PORT") {
                Some(v) => parse_var("PORT", &v)?,
                None => defaults.port,
            },
            max_upload_bytes: match var("MAX_UPLOAD_BYTES") {
                Some(v) => parse_var("MAX_UPLOAD_BYTES", &v)?,
                None => defaults.max_upload_bytes,
            },
        })
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> crate::Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| crate::Error::Config(format!("{} has invalid value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.google_api_key.is_none());
        assert_eq!(config.gemini_model, "gemini-1.5-flash-latest");
        assert_eq!(config.port, 5000);
        assert_eq!(config.gemini_timeout, Duration::from_secs(60));
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_TIMEOUT_SECS", "15"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.google_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.gemini_timeout, Duration::from_secs(15));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "  ")])).unwrap();
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_clean_keywords_trims_and_drops_blanks() {
        let raw = vec![" praia ".to_string(), "   ".to_string(), "sol".to_string()];
        assert_eq!(clean_keywords(raw), vec!["praia".to_string(), "sol".to_string()]);
    }

    #[test]
    fn test_caption_response_serialization() {
        let json = serde_json::to_string(&CaptionResponse {
            legenda: "Um gato.".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"legenda":"Um gato."}"#);
    }
}
