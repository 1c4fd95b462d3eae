use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Deepest crawl a request or configuration may ask for
pub const MAX_ALLOWED_DEPTH: u32 = 3;

/// Largest worker pool accepted
pub const MAX_CONCURRENCY: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth > MAX_ALLOWED_DEPTH {
        return Err(ConfigError::Validation(format!(
            "max-depth must be between 0 and {}, got {}",
            MAX_ALLOWED_DEPTH, config.max_depth
        )));
    }

    if config.max_total_pages < 1 {
        return Err(ConfigError::Validation(
            "max-total-pages must be >= 1, got 0".to_string(),
        ));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1, got 0".to_string(),
        ));
    }

    for ext in &config.skip_extensions {
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "skip-extensions entries must be bare extensions like 'pdf', got '{}'",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.report_dir.is_empty() {
        return Err(ConfigError::Validation(
            "report-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
