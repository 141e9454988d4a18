//! Runtime configuration.
//!
//! Read from the process environment after `.env` has been loaded.
//! `RUST_LOG` always wins over `XPLOR_LOG` for the log filter.

/// Enables or disables the tag bridge (`auto` | `off`)
pub const TAGS_ENV: &str = "XPLOR_TAGS";

/// Fallback log filter when `RUST_LOG` is unset
pub const LOG_ENV: &str = "XPLOR_LOG";

/// Default: warn for most crates, info for ours (tag writes visible)
pub const DEFAULT_LOG_FILTER: &str = "warn,xplor_lib=info";

/// How the tag bridge decides whether to touch Finder metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    /// Use the tag API when the OS provides it
    #[default]
    Auto,
    /// Behave as if the OS had no tag API
    Off,
}

impl TagMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" | "on" => Some(TagMode::Auto),
            "off" | "0" | "false" | "disabled" => Some(TagMode::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub tag_mode: TagMode,
    pub log_filter: String,
    /// Unrecognized `XPLOR_TAGS` value, reported once logging is up
    pub rejected_tag_mode: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tag_mode: TagMode::Auto,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            rejected_tag_mode: None,
        }
    }
}

impl AppConfig {
    /// Load `.env` and read the configuration from the environment.
    pub fn load() -> Self {
        load_dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(TAGS_ENV) {
            match TagMode::parse(&raw) {
                Some(mode) => config.tag_mode = mode,
                None => config.rejected_tag_mode = Some(raw),
            }
        }

        if let Some(filter) = lookup(LOG_ENV).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        config
    }
}

/// Load `.env`, trying the current directory first, then its parent
/// (running from inside the crate directory during development).
pub fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tag_mode, TagMode::Auto);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_tag_mode_parse() {
        assert_eq!(TagMode::parse("auto"), Some(TagMode::Auto));
        assert_eq!(TagMode::parse(" OFF "), Some(TagMode::Off));
        assert_eq!(TagMode::parse("false"), Some(TagMode::Off));
        assert_eq!(TagMode::parse(""), Some(TagMode::Auto));
        assert_eq!(TagMode::parse("sometimes"), None);
    }

    #[test]
    fn test_tags_off() {
        let config = config_from(&[(TAGS_ENV, "off")]);
        assert_eq!(config.tag_mode, TagMode::Off);
        assert!(config.rejected_tag_mode.is_none());
    }

    #[test]
    fn test_unknown_tag_mode_falls_back_to_auto() {
        let config = config_from(&[(TAGS_ENV, "maybe")]);
        assert_eq!(config.tag_mode, TagMode::Auto);
        assert_eq!(config.rejected_tag_mode.as_deref(), Some("maybe"));
    }

    #[test]
    fn test_log_filter_override() {
        let config = config_from(&[(LOG_ENV, "debug")]);
        assert_eq!(config.log_filter, "debug");

        let blank = config_from(&[(LOG_ENV, "  ")]);
        assert_eq!(blank.log_filter, DEFAULT_LOG_FILTER);
    }
}
