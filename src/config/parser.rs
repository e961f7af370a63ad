use crate::config::types::Settings;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates a settings document from TOML source
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    validate(&settings)?;
    Ok(settings)
}

/// Loads and parses a settings file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully loaded and validated settings
/// * `Err(ConfigError)` - Failed to read, parse, or validate
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use harvestman::config::load_settings;
///
/// let settings = load_settings(Path::new("harvestman.toml")).unwrap();
/// println!("Max depth: {}", settings.crawl.max_depth);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Computes the SHA-256 hash of a settings document's source text
///
/// The hash identifies a configuration version; a reload only swaps the
/// active snapshot when the hash changes.
pub fn settings_version(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
