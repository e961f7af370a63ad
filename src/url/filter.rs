use crate::ConfigError;
use regex::Regex;

/// Ordered set of compiled URL exclusion patterns
///
/// Patterns are compiled once at session start; a malformed pattern rejects
/// the whole session, so the crawl loop never sees a regex error.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    patterns: Vec<Regex>,
}

impl PatternFilter {
    /// Compiles a list of pattern strings, preserving their order
    ///
    /// # Arguments
    ///
    /// * `patterns` - Regex source strings, matched against full URL strings
    ///
    /// # Returns
    ///
    /// * `Ok(PatternFilter)` - All patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - The first pattern that failed
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| ConfigError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Whether a URL matches any configured pattern
    ///
    /// Patterns are evaluated in configured order and short-circuit on the
    /// first match. No patterns means nothing is excluded.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(url))
    }

    /// Number of compiled patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the filter holds no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
