use regex::{RegexSet, RegexSetBuilder};

/// Reply texts that mark a `550` as a reputation or blocklist refusal
/// rather than a statement about the mailbox.
pub const DEFAULT_POLICY_PATTERNS: &[&str] = &[
    r"spamhaus",
    r"\bblock ?list(ed)?\b",
    r"\bblack ?list(ed)?\b",
    r"\bdeny ?list(ed)?\b",
    r"\breputation\b",
    r"\bblocked using\b",
];

/// Case-insensitive matcher compiled once from the configured patterns.
#[derive(Debug, Clone)]
pub struct PolicyMatcher {
    set: RegexSet,
}

impl PolicyMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self { set })
    }

    /// Matcher that never fires.
    pub fn none() -> Self {
        Self {
            set: RegexSet::empty(),
        }
    }

    pub fn is_blocked(&self, message: &str) -> bool {
        self.set.is_match(message)
    }
}

impl Default for PolicyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_POLICY_PATTERNS).unwrap_or_else(|_| Self::none())
    }
}
