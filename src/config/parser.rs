use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

/// Interval used when `CRAWL_INTERVAL` / `crawler.interval` is absent or malformed
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use newsbot_crawler::config::load_config;
///
/// let config = load_config(Path::new("newsbot.toml")).unwrap();
/// println!("Interval: {:?}", config.crawler.interval());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Builds the configuration when no file is given: defaults plus environment
pub fn default_config() -> Result<Config, ConfigError> {
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies `CRAWL_INTERVAL` and `DATABASE_PATH` from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Applies overrides using the given variable lookup
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(interval) = lookup("CRAWL_INTERVAL") {
        config.crawler.interval = Some(interval);
    }

    if let Some(path) = lookup("DATABASE_PATH").filter(|p| !p.trim().is_empty()) {
        config.storage.database_path = path;
    }
}

/// Resolves the cycle interval, falling back to [`DEFAULT_INTERVAL`]
pub fn parse_interval(raw: Option<&str>) -> Duration {
    let Some(raw) = raw else {
        return DEFAULT_INTERVAL;
    };

    match parse_duration(raw) {
        Ok(interval) if !interval.is_zero() => interval,
        Ok(_) => {
            tracing::warn!("Crawl interval {:?} is zero, using {:?}", raw, DEFAULT_INTERVAL);
            DEFAULT_INTERVAL
        }
        Err(e) => {
            tracing::warn!("{}, using {:?}", e, DEFAULT_INTERVAL);
            DEFAULT_INTERVAL
        }
    }
}

/// Parses a duration string such as `"300ms"`, `"1.5h"` or `"2h45m"`
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Negative
/// durations are rejected.
pub fn parse_duration(input: &str) -> ConfigResult<Duration> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());

    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let s = s.strip_prefix('+').unwrap_or(s);
    if s.is_empty() || s.starts_with('-') {
        return Err(invalid());
    }

    let mut nanos = 0f64;
    let mut rest = s;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_end].parse().map_err(|_| invalid())?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    Ok(Duration::from_nanos(nanos as u64))
}
