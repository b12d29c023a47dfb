use std::io::Read;

use crate::{internal::MatcherImpl, LineSink, Result, ScanSummary};

/// A compiled line matcher.
///
/// It holds the byte NFA compiled from the patterns and the DFA that is grown
/// lazily while inputs are scanned. The DFA is retained between calls, so scanning
/// several inputs through the same matcher reuses every state discovered so far.
///
/// All scanning methods take `&mut self` because they may extend the DFA; a matcher
/// is a single-threaded value.
///
/// To create a matcher, use the [crate::MatcherBuilder].
pub struct Matcher {
    pub(crate) inner: MatcherImpl,
}

impl Matcher {
    /// Scans the input and reports every hit line to the sink.
    ///
    /// Hits are decided per line: a line is a hit if the automaton reports a match
    /// at its terminating newline, XOR the inverse-match configuration. The sink
    /// may stop the scan at any line boundary by returning `false`.
    ///
    /// An unterminated last line is still matched; its hit carries the
    /// [crate::LineMatch::is_unterminated] flag.
    pub fn scan<R: Read, S: LineSink>(&mut self, input: R, sink: &mut S) -> Result<ScanSummary> {
        self.inner.scan(input, sink)
    }

    /// Scans the input and returns the number of hit lines.
    pub fn count<R: Read>(&mut self, input: R) -> Result<u64> {
        self.inner.count(input)
    }

    /// Returns true as soon as any line of the input is a hit.
    /// The scan stops at the first hit line.
    pub fn is_match<R: Read>(&mut self, input: R) -> Result<bool> {
        self.inner.is_match(input)
    }

    /// Renders the compiled NFA to graphviz dot format, for debugging.
    #[cfg(feature = "dot_writer")]
    pub fn render_nfa<W: std::io::Write>(&self, label: &str, output: &mut W) {
        self.inner.render_nfa(label, output);
    }

    /// Renders the DFA states materialized so far to graphviz dot format, for
    /// debugging. Scan some input first, otherwise only the start state exists.
    #[cfg(feature = "dot_writer")]
    pub fn render_dfa<W: std::io::Write>(&self, label: &str, output: &mut W) {
        self.inner.render_dfa(label, output);
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("nfa_nodes", &self.inner.nfa_node_count())
            .field("dfa_states", &self.inner.dfa_state_count())
            .finish()
    }
}
