use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let at_least = |var: &str, value: usize, min: usize| -> Result<usize, ConfigError> {
        if value < min {
            return Err(invalid(var, format!("must be at least {min}, got {value}")));
        }
        Ok(value)
    };

    let brave_api_key = require("BRAVE_API_KEY")?;
    let gemini_api_key = require("GEMINI_API_KEY")?;

    let env = parse_environment(&or_default("MARKETPULSE_ENV", "development"))?;
    let bind_addr = parse_addr("MARKETPULSE_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("MARKETPULSE_LOG_LEVEL", "info");

    let gemini_model = or_default("MARKETPULSE_GEMINI_MODEL", "gemini-2.0-flash");
    let brave_base_url = or_default("MARKETPULSE_BRAVE_BASE_URL", "https://api.search.brave.com");
    let gemini_base_url = or_default(
        "MARKETPULSE_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let user_agent = or_default("MARKETPULSE_USER_AGENT", "marketpulse/0.1 (news-sentiment)");

    let max_articles = at_least(
        "MARKETPULSE_MAX_ARTICLES",
        parse_usize("MARKETPULSE_MAX_ARTICLES", "20")?,
        1,
    )?;
    let default_articles = at_least(
        "MARKETPULSE_DEFAULT_ARTICLES",
        parse_usize("MARKETPULSE_DEFAULT_ARTICLES", "5")?,
        1,
    )?;
    let search_overfetch_percent = at_least(
        "MARKETPULSE_SEARCH_OVERFETCH_PERCENT",
        parse_usize("MARKETPULSE_SEARCH_OVERFETCH_PERCENT", "150")?,
        100,
    )?;

    let search_timeout_secs = parse_u64("MARKETPULSE_SEARCH_TIMEOUT_SECS", "10")?;
    let extract_timeout_secs = parse_u64("MARKETPULSE_EXTRACT_TIMEOUT_SECS", "12")?;
    let model_timeout_secs = parse_u64("MARKETPULSE_MODEL_TIMEOUT_SECS", "30")?;
    let search_max_retries = parse_u32("MARKETPULSE_SEARCH_MAX_RETRIES", "1")?;
    let model_max_retries = parse_u32("MARKETPULSE_MODEL_MAX_RETRIES", "1")?;
    let retry_backoff_ms = parse_u64("MARKETPULSE_RETRY_BACKOFF_MS", "500")?;
    let request_timeout_secs = parse_u64("MARKETPULSE_REQUEST_TIMEOUT_SECS", "90")?;

    let max_concurrency = at_least(
        "MARKETPULSE_MAX_CONCURRENCY",
        parse_usize("MARKETPULSE_MAX_CONCURRENCY", "4")?,
        1,
    )?;
    let prompt_max_chars = parse_usize("MARKETPULSE_PROMPT_MAX_CHARS", "12000")?;
    let summary_max_chars = at_least(
        "MARKETPULSE_SUMMARY_MAX_CHARS",
        parse_usize("MARKETPULSE_SUMMARY_MAX_CHARS", "1000")?,
        1,
    )?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        brave_api_key,
        gemini_api_key,
        gemini_model,
        brave_base_url,
        gemini_base_url,
        user_agent,
        default_articles,
        max_articles,
        search_overfetch_percent,
        search_timeout_secs,
        extract_timeout_secs,
        model_timeout_secs,
        search_max_retries,
        model_max_retries,
        retry_backoff_ms,
        request_timeout_secs,
        max_concurrency,
        prompt_max_chars,
        summary_max_chars,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MARKETPULSE_ENV".to_string(),
            reason: format!("expected development, test or production, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
