/// Module that provides the chunked node and state storage.
mod arena;
pub(crate) use arena::Arena;

/// Module with the rewrite of large alternations into 256-way dispatch nodes.
pub(crate) mod case_dispatch;

/// Module that expands character class expressions into UTF-8 byte NFAs.
pub(crate) mod class_expr;

/// Module with the lazy DFA.
mod dfa;
pub(crate) use dfa::{LazyDfa, StateID};

/// Module with conversion to graphviz dot format
#[cfg(feature = "dot_writer")]
pub(crate) mod dot;

/// Module with the matcher implementation.
mod matcher_impl;
pub(crate) use matcher_impl::{MatchConfig, MatcherImpl};

/// The nfa module contains the byte NFA and its fragment builder.
mod nfa;
pub(crate) use nfa::{Frag, Nfa, NodeID, NodeKind};

/// The parser module contains the pattern parser.
mod parser;
pub(crate) use parser::parse_patterns;

/// Module with the buffered line scan loop.
mod scan;
pub(crate) use scan::ScanDriver;
