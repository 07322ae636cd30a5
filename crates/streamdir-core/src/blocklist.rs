//! Display-name blocklist.
//!
//! Runs before dedup so a blocked near-duplicate can never displace a kept
//! entry in the result set.

/// Configured banned substrings. Matching is case-sensitive substring
/// containment, not full match, not regex. An empty list keeps everything.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    terms: Vec<String>,
}

impl Blocklist {
    pub fn new(terms: impl IntoIterator<Item = String>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    /// True iff `name` contains any banned substring.
    pub fn is_blocked(&self, name: &str) -> bool {
        self.terms.iter().any(|term| name.contains(term.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blocklist_keeps_everything() {
        let bl = Blocklist::default();
        assert!(!bl.is_blocked("Anything At All"));
    }

    #[test]
    fn substring_match_blocks() {
        let bl = Blocklist::new(vec!["shopping".to_string()]);
        assert!(bl.is_blocked("24h shopping channel"));
        assert!(!bl.is_blocked("News 24"));
    }

    #[test]
    fn match_is_case_sensitive() {
        let bl = Blocklist::new(vec!["Shop".to_string()]);
        assert!(bl.is_blocked("TeleShop"));
        assert!(!bl.is_blocked("teleshop"));
    }

    #[test]
    fn non_ascii_terms_match() {
        let bl = Blocklist::new(vec!["广播".to_string()]);
        assert!(bl.is_blocked("广播X"));
        assert!(!bl.is_blocked("Alice"));
    }
}
