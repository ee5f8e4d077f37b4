//! Recovering the new issue key from the client's human-oriented create output.
//!
//! The client prints free text; nothing guarantees a machine-readable payload, so the
//! scraping is kept behind [`IssueKeyExtractor`] and can be swapped wholesale.

use regex::Regex;

pub const ISSUE_KEY_PATTERN: &str = r"([A-Z]+-\d+)";

pub trait IssueKeyExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Option<String>;
}

/// First match of a regular expression; the first capture group wins if present.
#[derive(Debug, Clone)]
pub struct PatternKeyExtractor {
    pattern: Regex,
}

impl PatternKeyExtractor {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Default for PatternKeyExtractor {
    fn default() -> Self {
        Self::new(Regex::new(ISSUE_KEY_PATTERN).expect("regex"))
    }
}

impl IssueKeyExtractor for PatternKeyExtractor {
    fn extract(&self, text: &str) -> Option<String> {
        let captures = self.pattern.captures(text)?;
        captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|found| found.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_key_from_create_output() {
        let extractor = PatternKeyExtractor::default();
        let output = "✓ Issue created\nhttps://issues.myorg.com/browse/MYTEAM-42\nsee also OPS-1";
        assert_eq!(extractor.extract(output), Some("MYTEAM-42".to_string()));
    }

    #[test]
    fn lowercase_or_keyless_text_yields_none() {
        let extractor = PatternKeyExtractor::default();
        assert_eq!(extractor.extract("created myteam-42"), None);
        assert_eq!(extractor.extract(""), None);
    }

    #[test]
    fn custom_pattern_without_group_uses_whole_match() {
        let extractor = PatternKeyExtractor::new(Regex::new(r"OPS-\d+").expect("regex"));
        assert_eq!(extractor.extract("key: OPS-9"), Some("OPS-9".to_string()));
    }
}
