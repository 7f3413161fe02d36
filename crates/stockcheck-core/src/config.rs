use crate::app_config::{AppConfig, Environment};
use crate::policy::AvailabilityPolicy;
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// All parsing and validation lives here so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

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

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_timeout = |var: &str, default: &str| -> Result<u64, ConfigError> {
        match parse_u64(var, default)? {
            0 => Err(invalid(var, "timeout must be at least 1 second".to_string())),
            secs => Ok(secs),
        }
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true/false/1/0/yes/no/on/off".to_string(),
            )
        })
    };

    let env = parse_environment(&or_default("STOCKCHECK_ENV", "development"))?;
    let bind_addr = parse_addr("STOCKCHECK_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("STOCKCHECK_LOG_LEVEL", "info");

    let site_base_url = or_default("STOCKCHECK_SITE_BASE_URL", "https://www.zara.com")
        .trim_end_matches('/')
        .to_string();
    if !(site_base_url.starts_with("http://") || site_base_url.starts_with("https://")) {
        return Err(invalid(
            "STOCKCHECK_SITE_BASE_URL",
            format!("expected an http(s) origin, got '{site_base_url}'"),
        ));
    }
    let site_locale = or_default("STOCKCHECK_SITE_LOCALE", "tr/tr")
        .trim_matches('/')
        .to_string();

    // A blank key is treated the same as no key at all.
    let proxy_api_key = lookup("ZENROWS_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let proxy_endpoint = or_default("STOCKCHECK_PROXY_ENDPOINT", "https://api.zenrows.com/v1/");
    let proxy_js_render = parse_bool("STOCKCHECK_PROXY_JS_RENDER", "false")?;
    let proxy_wait_ms = parse_u64("STOCKCHECK_PROXY_WAIT_MS", "0")?;
    let prefer_proxy = parse_bool("STOCKCHECK_PREFER_PROXY", "true")?;

    let direct_timeout_secs = parse_timeout("STOCKCHECK_DIRECT_TIMEOUT_SECS", "20")?;
    let proxy_timeout_secs = parse_timeout("STOCKCHECK_PROXY_TIMEOUT_SECS", "30")?;

    let user_agent = or_default("STOCKCHECK_USER_AGENT", DEFAULT_USER_AGENT);
    let accept_language = or_default("STOCKCHECK_ACCEPT_LANGUAGE", DEFAULT_ACCEPT_LANGUAGE);

    let availability_policy = lookup("STOCKCHECK_POSITIVE_CODES")
        .map(|raw| AvailabilityPolicy::from_csv(&raw))
        .unwrap_or_default();
    if availability_policy.positive_codes().is_empty() {
        return Err(invalid(
            "STOCKCHECK_POSITIVE_CODES",
            "at least one availability code is required".to_string(),
        ));
    }

    let search_fallback = parse_bool("STOCKCHECK_SEARCH_FALLBACK", "true")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        site_base_url,
        site_locale,
        proxy_api_key,
        proxy_endpoint,
        proxy_js_render,
        proxy_wait_ms,
        prefer_proxy,
        direct_timeout_secs,
        proxy_timeout_secs,
        user_agent,
        accept_language,
        availability_policy,
        search_fallback,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOCKCHECK_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
