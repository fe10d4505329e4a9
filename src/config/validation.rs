use crate::config::types::{Config, CrawlerConfig, FilterConfig, UserAgentConfig};
use crate::ConfigError;

const MAX_WORKERS: usize = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_filter_config(&config.filter)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.frontier_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "frontier_capacity must be >= 1, got {}",
            config.frontier_capacity
        )));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 1ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.block_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "block_timeout_ms must be >= 1ms, got {}ms",
            config.block_timeout_ms
        )));
    }

    Ok(())
}

/// Validates request header configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    // Header values must be visible ASCII
    for (name, value) in [
        ("user agent", &config.value),
        ("accept_language", &config.accept_language),
    ] {
        if !value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
            return Err(ConfigError::Validation(format!(
                "{} contains characters not allowed in an HTTP header: '{}'",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates the extension block-list additions
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    for ext in &config.extra_extensions {
        validate_extension(ext)?;
    }
    Ok(())
}

fn validate_extension(ext: &str) -> Result<(), ConfigError> {
    let Some(body) = ext.strip_prefix('.') else {
        return Err(ConfigError::Validation(format!(
            "extension '{}' must start with '.'",
            ext
        )));
    };

    if body.is_empty() || body.contains('.') || body.contains('/') {
        return Err(ConfigError::Validation(format!(
            "extension '{}' must be a single non-empty suffix such as '.woff2'",
            ext
        )));
    }

    Ok(())
}
