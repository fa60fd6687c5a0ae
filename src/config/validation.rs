use crate::config::types::{
    Config, DatabaseConfig, GatewayConfig, HttpConfig, IdentifierConfig, LockConfig, TobaConfig,
};
use crate::ident::MAX_NODE_ID;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_database_config(&config.database)?;
    validate_identifier_config(&config.identifiers)?;
    validate_http_config(&config.http)?;
    validate_lock_config(&config.lock, &config.http)?;
    validate_gateway_config(&config.gateway)?;
    validate_toba_config(&config.toba)?;
    Ok(())
}

fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_identifier_config(config: &IdentifierConfig) -> Result<(), ConfigError> {
    if config.node_id > MAX_NODE_ID {
        return Err(ConfigError::Validation(format!(
            "node-id must be between 0 and {}, got {}",
            MAX_NODE_ID, config.node_id
        )));
    }
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got timeout-secs={} connect-timeout-secs={}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Lock staleness must be positive and longer than one request
fn validate_lock_config(config: &LockConfig, http: &HttpConfig) -> Result<(), ConfigError> {
    if config.stale_after_secs < 1 {
        return Err(ConfigError::Validation(
            "lock stale-after-secs must be >= 1".to_string(),
        ));
    }

    if config.stale_after_secs <= http.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "lock stale-after-secs ({}) must exceed http timeout-secs ({})",
            config.stale_after_secs, http.timeout_secs
        )));
    }

    Ok(())
}

fn validate_gateway_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    validate_base_url("gateway", &config.base_url)?;

    if config.language_code.is_empty() {
        return Err(ConfigError::Validation(
            "gateway language-code cannot be empty".to_string(),
        ));
    }

    if config.versions.is_empty() {
        return Err(ConfigError::Validation(
            "gateway must allow at least one version code".to_string(),
        ));
    }

    if config.versions.iter().any(|code| code.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "gateway version codes cannot be empty".to_string(),
        ));
    }

    if config.chapters_per_request < 1 {
        return Err(ConfigError::Validation(format!(
            "chapters-per-request must be >= 1, got {}",
            config.chapters_per_request
        )));
    }

    Ok(())
}

fn validate_toba_config(config: &TobaConfig) -> Result<(), ConfigError> {
    validate_base_url("toba", &config.base_url)?;

    for (key, value) in [
        ("language-code", &config.language_code),
        ("version-code", &config.version_code),
        ("version-slug", &config.version_slug),
        ("old-testament-fragment", &config.old_testament_fragment),
        ("new-testament-fragment", &config.new_testament_fragment),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!(
                "toba {} cannot be empty",
                key
            )));
        }
    }

    Ok(())
}

/// Base URLs must be absolute http(s) URLs
fn validate_base_url(section: &str, base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid {} base-url '{}': {}", section, base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} base-url '{}' must use http or https",
            section, base_url
        )));
    }

    Ok(())
}
