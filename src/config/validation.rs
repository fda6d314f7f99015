use crate::config::types::{Config, CrawlerConfig, MarkerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_marker_config(&config.markers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    // Must be usable as an HTTP header value
    if config.value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user agent must not contain control characters, got '{}'",
            config.value.escape_debug()
        )));
    }

    Ok(())
}

/// Validates link and content markers
fn validate_marker_config(config: &MarkerConfig) -> Result<(), ConfigError> {
    validate_path_marker("category_path", &config.category_path)?;
    validate_path_marker("question_path", &config.question_path)?;

    if config.category_path == config.question_path {
        return Err(ConfigError::Validation(format!(
            "category_path and question_path must differ, both are '{}'",
            config.category_path
        )));
    }

    validate_class_name("question_class", &config.question_class)?;
    validate_class_name("answer_class", &config.answer_class)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.table_path.is_empty() {
        return Err(ConfigError::Validation(
            "table_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// A path marker is matched as a plain substring of an href
fn validate_path_marker(field: &str, marker: &str) -> Result<(), ConfigError> {
    if marker.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if marker.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{} must not contain whitespace, got '{}'",
            field, marker
        )));
    }

    Ok(())
}

/// Checks that a class name can be used in a `.class` selector
fn validate_class_name(field: &str, class: &str) -> Result<(), ConfigError> {
    let mut chars = class.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return Err(ConfigError::Validation(format!("{} cannot be empty", field))),
    };

    if first.is_ascii_digit() || !(first.is_alphabetic() || first == '_' || first == '-') {
        return Err(ConfigError::Validation(format!(
            "{} must start with a letter, '_' or '-', got '{}'",
            field, class
        )));
    }

    if !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(ConfigError::Validation(format!(
            "{} must contain only letters, digits, '_' and '-', got '{}'",
            field, class
        )));
    }

    Ok(())
}
