use crate::{internal::MatchConfig, internal::MatcherImpl, Matcher, Result};

/// A builder for creating a [Matcher].
///
/// At least one pattern must be added. Several patterns act as alternatives: a line
/// is a hit if any pattern matches it.
#[derive(Debug, Clone, Default)]
pub struct MatcherBuilder {
    patterns: Vec<String>,
    config: MatchConfig,
}

impl MatcherBuilder {
    /// Creates a new matcher builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern to the matcher builder.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    /// Adds multiple patterns to the matcher builder.
    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.patterns
            .extend(patterns.into_iter().map(|p| p.as_ref().to_string()));
        self
    }

    /// Folds ASCII `A-Z` to `a-z`, both in the patterns and in the scanned input.
    /// Folding is byte-level ASCII only; non-ASCII characters are never folded.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.config.case_fold = yes;
        self
    }

    /// Inverts the per-line hit decision: lines that do NOT match become the hits.
    pub fn invert_match(mut self, yes: bool) -> Self {
        self.config.invert = yes;
        self
    }

    /// Treats the patterns as literal strings instead of regular expressions.
    pub fn literal(mut self, yes: bool) -> Self {
        self.config.literal = yes;
        self
    }

    /// Builds the matcher from the matcher builder.
    pub fn build(self) -> Result<Matcher> {
        Ok(Matcher {
            inner: MatcherImpl::compile(&self.patterns, self.config)?,
        })
    }
}
