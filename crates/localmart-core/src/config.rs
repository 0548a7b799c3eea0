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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let supabase_url = parse_http_url("SUPABASE_URL", &require("SUPABASE_URL")?)?;
    let supabase_anon_key = require("SUPABASE_ANON_KEY")?;

    let env = parse_environment(&or_default("LOCALMART_ENV", "development"))?;
    let site_url = parse_http_url(
        "LOCALMART_SITE_URL",
        &or_default("LOCALMART_SITE_URL", "http://localhost:5173"),
    )?;
    let log_level = or_default("LOCALMART_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("LOCALMART_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("LOCALMART_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("LOCALMART_RETRY_BACKOFF_BASE_MS", "500")?;
    let locate_timeout_secs = parse_u64("LOCALMART_LOCATE_TIMEOUT_SECS", "10")?;

    let geoip_url = match lookup("LOCALMART_GEOIP_URL") {
        Ok(raw) if !raw.trim().is_empty() => Some(parse_http_url("LOCALMART_GEOIP_URL", &raw)?),
        _ => None,
    };

    Ok(AppConfig {
        env,
        site_url,
        log_level,
        supabase_url,
        supabase_anon_key,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        locate_timeout_secs,
        geoip_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `staging`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOCALMART_ENV".to_string(),
            reason: format!("expected development, staging, or production, got '{other}'"),
        }),
    }
}

/// Accepts only absolute `http://` or `https://` URLs with a host part.
fn parse_http_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("'{trimmed}' is not an http(s) URL"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
