use crate::config::OverrideEntry;
use crate::ConfigError;
use rand::Rng;
use regex::Regex;

/// One compiled single-document destination rule
///
/// Matching URLs get an extra settle wait before extraction and, unless
/// `recurse` is set, contribute no further tasks to the frontier. Shared
/// conversation pages are the canonical case: they are final documents,
/// not hub pages, and render slowly.
#[derive(Debug, Clone)]
pub struct OverrideRule {
    pattern: Regex,
    min_wait: f64,
    max_wait: f64,
    recurse: bool,
}

impl OverrideRule {
    /// Samples a settle wait from the rule's window, in seconds
    pub fn sample_wait(&self) -> f64 {
        if self.max_wait > self.min_wait {
            rand::thread_rng().gen_range(self.min_wait..=self.max_wait)
        } else {
            self.min_wait
        }
    }

    /// Whether links on matching pages are followed
    pub fn recurse(&self) -> bool {
        self.recurse
    }
}

/// Pattern-keyed table of fetch overrides
///
/// New special cases are data: an entry in the table, not a code branch in
/// the crawl loop.
#[derive(Debug, Clone)]
pub struct OverrideTable {
    rules: Vec<OverrideRule>,
}

impl OverrideTable {
    /// Compiles a table from configured entries
    pub fn from_entries(entries: &[OverrideEntry]) -> Result<Self, ConfigError> {
        let rules = entries
            .iter()
            .map(|entry| {
                let pattern =
                    Regex::new(&entry.pattern).map_err(|e| ConfigError::InvalidPattern {
                        pattern: entry.pattern.clone(),
                        message: e.to_string(),
                    })?;
                Ok(OverrideRule {
                    pattern,
                    min_wait: entry.min_wait,
                    max_wait: entry.max_wait,
                    recurse: entry.recurse,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    /// The built-in rules: shared conversation hosts get a 5-8 s settle
    /// window and no recursion
    pub fn builtin() -> Self {
        Self::from_entries(&Self::builtin_entries()).expect("built-in override rules are valid")
    }

    /// Built-in rules as plain entries, for merging with configured ones
    pub fn builtin_entries() -> Vec<OverrideEntry> {
        ["chat\\.openai\\.com/share/", "chatgpt\\.com/share/"]
            .into_iter()
            .map(|pattern| OverrideEntry {
                pattern: pattern.to_string(),
                min_wait: 5.0,
                max_wait: 8.0,
                recurse: false,
            })
            .collect()
    }

    /// Returns the first rule matching the URL, in table order
    pub fn lookup(&self, url: &str) -> Option<&OverrideRule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(url))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_matches_shared_conversation_urls() {
        let table = OverrideTable::builtin();
        assert!(table
            .lookup("https://chat.openai.com/share/abc-123")
            .is_some());
        assert!(table.lookup("https://chatgpt.com/share/abc-123").is_some());
        assert!(table.lookup("https://example.com/share/abc").is_none());
    }

    #[test]
    fn test_builtin_rules_are_terminal() {
        let table = OverrideTable::builtin();
        let rule = table.lookup("https://chat.openai.com/share/x").unwrap();
        assert!(!rule.recurse());
    }

    #[test]
    fn test_sample_wait_within_window() {
        let table = OverrideTable::builtin();
        let rule = table.lookup("https://chatgpt.com/share/x").unwrap();
        for _ in 0..20 {
            let wait = rule.sample_wait();
            assert!((5.0..=8.0).contains(&wait), "wait {} out of window", wait);
        }
    }

    #[test]
    fn test_degenerate_window() {
        let table = OverrideTable::from_entries(&[OverrideEntry {
            pattern: "slow".to_string(),
            min_wait: 3.0,
            max_wait: 3.0,
            recurse: true,
        }])
        .unwrap();
        let rule = table.lookup("https://slow.example.com/").unwrap();
        assert_eq!(rule.sample_wait(), 3.0);
        assert!(rule.recurse());
    }

    #[test]
    fn test_first_match_wins() {
        let entries = vec![
            OverrideEntry {
                pattern: "example".to_string(),
                min_wait: 1.0,
                max_wait: 1.0,
                recurse: true,
            },
            OverrideEntry {
                pattern: "example\\.com".to_string(),
                min_wait: 9.0,
                max_wait: 9.0,
                recurse: false,
            },
        ];
        let table = OverrideTable::from_entries(&entries).unwrap();
        let rule = table.lookup("https://example.com/").unwrap();
        assert_eq!(rule.sample_wait(), 1.0);
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let entries = vec![OverrideEntry {
            pattern: "[broken".to_string(),
            min_wait: 1.0,
            max_wait: 2.0,
            recurse: false,
        }];
        assert!(matches!(
            OverrideTable::from_entries(&entries),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
