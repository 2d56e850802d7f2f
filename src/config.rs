//! Configuration Module
//!
//! Service configuration loaded from environment variables, and the
//! per-record-type settings of the cache-aside layer.

use std::env;
use std::time::Duration;

use crate::cache::WritePolicy;
use crate::error::Result;
use crate::lang::{Languages, DEFAULT_LANGUAGE, DEFAULT_LANGUAGES};

/// Default entry lifetime in seconds.
pub const DEFAULT_TTL_SECS: u64 = 3600;

// == Cache Settings ==
/// Settings for one `CacheAside` instance.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Supported language variants and the fallback
    pub languages: Languages,
    /// Entry lifetime; `None` stores entries without expiry
    pub ttl: Option<Duration>,
    /// Key prefix; `None` uses the record's lower-cased type name
    pub prefix: Option<String>,
    /// What the mutation hooks do besides refreshing single-record entries
    pub write_policy: WritePolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            languages: Languages::default(),
            ttl: Some(Duration::from_secs(DEFAULT_TTL_SECS)),
            prefix: None,
            write_policy: WritePolicy::default(),
        }
    }
}

impl CacheSettings {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> CacheSettingsBuilder {
        CacheSettingsBuilder::default()
    }
}

// == Cache Settings Builder ==
/// Builder for `CacheSettings`.
#[derive(Debug, Default)]
pub struct CacheSettingsBuilder {
    settings: CacheSettings,
}

impl CacheSettingsBuilder {
    /// Sets the supported language variants.
    pub fn languages(mut self, languages: Languages) -> Self {
        self.settings.languages = languages;
        self
    }

    /// Sets a finite entry lifetime.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.settings.ttl = Some(ttl);
        self
    }

    /// Stores entries without expiry.
    pub fn no_expiry(mut self) -> Self {
        self.settings.ttl = None;
        self
    }

    /// Overrides the key prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.prefix = Some(prefix.into());
        self
    }

    /// Sets the mutation hook policy.
    pub fn write_policy(mut self, policy: WritePolicy) -> Self {
        self.settings.write_policy = policy;
        self
    }

    pub fn build(self) -> CacheSettings {
        self.settings
    }
}

// == Service Config ==
/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Cache entry TTL in seconds, 0 = no expiry
    pub cache_ttl: u64,
    /// Supported language variants
    pub languages: Vec<String>,
    /// Default language variant
    pub default_lang: String,
    /// Key prefix override
    pub cache_prefix: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `CACHE_TTL` - Entry TTL in seconds, 0 for none (default: 3600)
    /// - `CACHE_LANGS` - Comma-separated language variants (default: uz,ru,en)
    /// - `CACHE_DEFAULT_LANG` - Fallback language variant (default: uz)
    /// - `CACHE_PREFIX` - Key prefix override (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            languages: env::var("CACHE_LANGS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|l| l.trim().to_string())
                        .filter(|l| !l.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|langs| !langs.is_empty())
                .unwrap_or(defaults.languages),
            default_lang: env::var("CACHE_DEFAULT_LANG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.default_lang),
            cache_prefix: env::var("CACHE_PREFIX").ok().filter(|v| !v.is_empty()),
        }
    }

    // == Cache Settings ==
    /// Builds validated cache settings from this configuration.
    ///
    /// # Errors
    /// `InvalidConfig` if the default language is not among the supported ones.
    pub fn cache_settings(&self) -> Result<CacheSettings> {
        let languages = Languages::new(&self.languages, &self.default_lang)?;
        let mut builder = CacheSettings::builder().languages(languages);

        builder = if self.cache_ttl == 0 {
            builder.no_expiry()
        } else {
            builder.ttl(Duration::from_secs(self.cache_ttl))
        };

        if let Some(prefix) = &self.cache_prefix {
            builder = builder.prefix(prefix.clone());
        }

        Ok(builder.build())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 1,
            cache_ttl: DEFAULT_TTL_SECS,
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            default_lang: DEFAULT_LANGUAGE.to_string(),
            cache_prefix: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.languages, vec!["uz", "ru", "en"]);
        assert_eq!(config.default_lang, "uz");
        assert!(config.cache_prefix.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for var in [
            "SERVER_PORT",
            "CLEANUP_INTERVAL",
            "CACHE_TTL",
            "CACHE_LANGS",
            "CACHE_DEFAULT_LANG",
            "CACHE_PREFIX",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.default_lang, "uz");
    }

    #[test]
    fn test_default_cache_settings() {
        let settings = CacheSettings::default();
        assert_eq!(settings.ttl, Some(Duration::from_secs(3600)));
        assert_eq!(settings.languages.len(), 3);
        assert!(settings.prefix.is_none());
        assert_eq!(settings.write_policy, WritePolicy::CacheAndInvalidateCollections);
    }

    #[test]
    fn test_settings_builder() {
        let settings = CacheSettings::builder()
            .ttl(Duration::from_secs(60))
            .prefix("post")
            .write_policy(WritePolicy::CacheOnly)
            .build();
        assert_eq!(settings.ttl, Some(Duration::from_secs(60)));
        assert_eq!(settings.prefix.as_deref(), Some("post"));
        assert_eq!(settings.write_policy, WritePolicy::CacheOnly);

        let forever = CacheSettings::builder().no_expiry().build();
        assert!(forever.ttl.is_none());
    }

    #[test]
    fn test_cache_settings_from_config() {
        let config = Config {
            cache_ttl: 0,
            languages: vec!["EN".to_string(), "de".to_string()],
            default_lang: "de".to_string(),
            cache_prefix: Some("news".to_string()),
            ..Config::default()
        };

        let settings = config.cache_settings().unwrap();
        assert!(settings.ttl.is_none());
        assert_eq!(settings.languages.default_lang().as_str(), "de");
        assert!(settings.languages.contains("en"));
        assert_eq!(settings.prefix.as_deref(), Some("news"));
    }

    #[test]
    fn test_cache_settings_rejects_unknown_default() {
        let config = Config {
            default_lang: "fr".to_string(),
            ..Config::default()
        };
        assert!(config.cache_settings().is_err());
    }
}
