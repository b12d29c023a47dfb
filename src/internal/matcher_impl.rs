//! This module contains the matcher implementation behind the public [crate::Matcher].
//!
//! Compilation runs parse → case dispatch rewrite → DFA seeding once; every scan
//! afterwards drives the scan loop over the same NFA and the same lazily growing
//! DFA, so states discovered while scanning one input are reused for the next.

use std::io::Read;

use log::debug;

use crate::{LineMatch, LineSink, Result, ScanSummary};

use super::{case_dispatch, parse_patterns, LazyDfa, Nfa, NodeID, ScanDriver, StateID};

/// Runtime configuration of the matching core.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MatchConfig {
    /// Fold ASCII `A-Z` to `a-z` in the patterns and in the scanned input.
    pub(crate) case_fold: bool,
    /// Invert the per-line hit decision.
    pub(crate) invert: bool,
    /// Treat the patterns as literal strings.
    pub(crate) literal: bool,
}

pub(crate) struct MatcherImpl {
    nfa: Nfa,
    dfa: LazyDfa,
    #[cfg_attr(not(feature = "dot_writer"), allow(dead_code))]
    root: NodeID,
    seed: StateID,
    config: MatchConfig,
}

impl MatcherImpl {
    pub(crate) fn compile(patterns: &[String], config: MatchConfig) -> Result<Self> {
        let mut nfa = Nfa::new();
        let root = parse_patterns(&mut nfa, patterns, &config)?;
        let parsed_nodes = nfa.node_count();
        let root = case_dispatch::apply(&mut nfa, root);
        let mut dfa = LazyDfa::new();
        let seed = dfa.seed(&mut nfa, root);
        debug!(
            "compiled {} pattern(s): {} nfa nodes, {} after the dispatch rewrite",
            patterns.len(),
            parsed_nodes,
            nfa.node_count()
        );
        Ok(Self {
            nfa,
            dfa,
            root,
            seed,
            config,
        })
    }

    pub(crate) fn scan<R: Read, S: LineSink>(
        &mut self,
        input: R,
        sink: &mut S,
    ) -> Result<ScanSummary> {
        ScanDriver::new(
            &mut self.nfa,
            &mut self.dfa,
            self.seed,
            self.config.case_fold,
            self.config.invert,
            input,
        )
        .run(sink)
    }

    pub(crate) fn count<R: Read>(&mut self, input: R) -> Result<u64> {
        let mut sink = |_: &LineMatch<'_>| true;
        Ok(self.scan(input, &mut sink)?.matched)
    }

    pub(crate) fn is_match<R: Read>(&mut self, input: R) -> Result<bool> {
        let mut sink = |_: &LineMatch<'_>| false;
        Ok(self.scan(input, &mut sink)?.is_match())
    }

    pub(crate) fn nfa_node_count(&self) -> usize {
        self.nfa.node_count()
    }

    pub(crate) fn dfa_state_count(&self) -> usize {
        self.dfa.state_count()
    }

    #[cfg(feature = "dot_writer")]
    pub(crate) fn render_nfa<W: std::io::Write>(&self, label: &str, output: &mut W) {
        super::dot::nfa_render(&self.nfa, self.root, label, output);
    }

    #[cfg(feature = "dot_writer")]
    pub(crate) fn render_dfa<W: std::io::Write>(&self, label: &str, output: &mut W) {
        super::dot::dfa_render(&self.dfa, self.seed, label, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str], config: MatchConfig) -> MatcherImpl {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        MatcherImpl::compile(&patterns, config).unwrap()
    }

    #[test]
    fn test_count_and_is_match() {
        let mut m = matcher(&["ba"], MatchConfig::default());
        assert_eq!(m.count(&b"foo\nbar\nbaz\n"[..]).unwrap(), 2);
        assert!(m.is_match(&b"xbay\n"[..]).unwrap());
        assert!(!m.is_match(&b"nothing here\n"[..]).unwrap());
    }

    #[test]
    fn test_dfa_grows_across_scans_but_signatures_stay_shared() {
        let mut m = matcher(&["ab"], MatchConfig::default());
        m.count(&b"ab\ncd\n"[..]).unwrap();
        let after_first = m.dfa_state_count();
        m.count(&b"ab\ncd\n"[..]).unwrap();
        assert_eq!(m.dfa_state_count(), after_first);
        // New input bytes may add states, never duplicate old ones.
        m.count(&b"zz\n"[..]).unwrap();
        assert!(m.dfa_state_count() >= after_first);
    }

    #[test]
    fn test_literal_mode_escapes_metacharacters() {
        let mut m = matcher(
            &["a.b*"],
            MatchConfig {
                literal: true,
                ..Default::default()
            },
        );
        assert_eq!(m.count(&b"a.b*\naxbb\n"[..]).unwrap(), 1);
    }
}
