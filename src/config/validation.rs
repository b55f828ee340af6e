use crate::config::types::{Config, EngineConfig, TaskEntry, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_tasks(&config.tasks)?;
    Ok(())
}

/// Validates engine sizing
pub fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > 256 {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and 256, got {}",
            config.worker_count
        )));
    }

    if config.push_buffer < 1 {
        return Err(ConfigError::Validation(format!(
            "push_buffer must be >= 1, got {}",
            config.push_buffer
        )));
    }

    if config.result_buffer < 1 {
        return Err(ConfigError::Validation(format!(
            "result_buffer must be >= 1, got {}",
            config.result_buffer
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates task entries: unique names and at least one http(s) seed each
fn validate_tasks(tasks: &[TaskEntry]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for entry in tasks {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "task name cannot be empty".to_string(),
            ));
        }

        if !names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "task name '{}' is used more than once",
                entry.name
            )));
        }

        if entry.seeds.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Task '{}' must have at least one seed URL",
                entry.name
            )));
        }

        for seed in &entry.seeds {
            let url = Url::parse(seed).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
            })?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::Validation(format!(
                    "Seed URL '{}' must use HTTP or HTTPS",
                    seed
                )));
            }
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
