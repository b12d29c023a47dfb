#![forbid(missing_docs)]
//! # `grpr`
//! The `grpr` crate is a library that searches byte streams line by line for regular
//! expression matches, in the manner of grep.
//! Patterns are compiled into a byte-level NFA; matching runs on a DFA that is built
//! lazily from the NFA while the input is consumed, so only the automaton states an
//! input actually reaches are ever constructed. Character classes are expanded into
//! UTF-8 byte sequences, which lets the hot loop work on plain bytes throughout.
//! Matching reports whether a line matches; there is no submatch capture.
//!
//! The crate also ships a small grep-style command line tool (feature `cli`, on by
//! default).

/// Module with error definitions
mod errors;
pub use errors::{GrprError, GrprErrorKind, Result};

/// The module with internal implementation details.
mod internal;

/// Module that provides the LineMatch and ScanSummary types
mod line_match;
pub use line_match::{LineMatch, ScanSummary};

/// Module that provides the LineSink trait
mod line_sink;
pub use line_sink::LineSink;

/// The module with the matcher.
mod matcher;
pub use matcher::Matcher;

/// The module with the matcher builder.
mod matcher_builder;
pub use matcher_builder::MatcherBuilder;
