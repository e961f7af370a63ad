use crate::config::types::{CrawlPolicy, FetchDefaults, OverrideEntry, Settings};
use crate::url::PatternFilter;
use crate::ConfigError;

/// Validates the entire settings document
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_policy(&settings.crawl)?;
    validate_fetch(&settings.fetch)?;
    validate_overrides(&settings.overrides)?;
    Ok(())
}

/// Validates a crawl policy
///
/// Called both for file-sourced settings and for policies arriving inside a
/// crawl request: a bad policy rejects the session before any fetch.
pub fn validate_policy(policy: &CrawlPolicy) -> Result<(), ConfigError> {
    if policy.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 1, got {}",
            policy.max_depth
        )));
    }

    if policy.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            policy.max_pages
        )));
    }

    if policy.max_concurrent_fetches < 1 || policy.max_concurrent_fetches > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 64, got {}",
            policy.max_concurrent_fetches
        )));
    }

    for domain in &policy.restrict_to_domains {
        validate_domain_string(domain)?;
    }

    // Fail fast on malformed regexes so the crawl loop never sees one
    PatternFilter::compile(&policy.exclude_url_patterns)?;

    Ok(())
}

/// Validates fetch defaults
fn validate_fetch(fetch: &FetchDefaults) -> Result<(), ConfigError> {
    if fetch.page_load_timeout < 1 || fetch.page_load_timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "page_load_timeout must be between 1 and 300 seconds, got {}",
            fetch.page_load_timeout
        )));
    }

    if !(0.0..=60.0).contains(&fetch.dynamic_content_wait) {
        return Err(ConfigError::Validation(format!(
            "dynamic_content_wait must be between 0 and 60 seconds, got {}",
            fetch.dynamic_content_wait
        )));
    }

    Ok(())
}

/// Validates single-document destination overrides
fn validate_overrides(overrides: &[OverrideEntry]) -> Result<(), ConfigError> {
    for entry in overrides {
        regex::Regex::new(&entry.pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: entry.pattern.clone(),
            message: e.to_string(),
        })?;

        if entry.min_wait < 0.0 || entry.max_wait < entry.min_wait {
            return Err(ConfigError::Validation(format!(
                "override '{}' has an invalid wait window [{}, {}]",
                entry.pattern, entry.min_wait, entry.max_wait
            )));
        }
    }

    Ok(())
}

/// Validates a restriction-list domain string
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::Validation(
            "restrict_to_domains entries cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
