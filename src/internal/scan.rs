//! This module contains the buffered line scan loop.
//!
//! Input is consumed through a rolling buffer split into a carry-over prefix and
//! a fresh read area of 16 KiB each. When the read area drains mid-line, the tail
//! of the current line shifts into the prefix (capped at the prefix size, so an
//! over-long line keeps only its last window) and the read area refills. Every
//! byte is stepped through the DFA; a line's hit decision falls out of the state
//! reached by its newline. A non-empty input that does not end in a newline gets
//! a synthetic one so the final line is decided like any other.

use std::io::Read;

use log::debug;

use crate::{LineMatch, LineSink, Result, ScanSummary};

use super::{LazyDfa, Nfa, StateID};

/// Size of the carry-over prefix area and of each fresh read.
const WINDOW: usize = 16 * 1024;

/// The sink may flush once every `FLUSH_MASK + 1` lines.
const FLUSH_MASK: u64 = (1 << 9) - 1;

/// The phase of the scanner between two actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Inside a line, stepping bytes through the DFA.
    ///
    /// Leaves for AtLineEnd when a newline is consumed, or for Draining when
    /// the buffered data runs out.
    Scanning,

    /// A newline was just consumed; the line is decided and reported, then the
    /// line start moves past it.
    ///
    /// Leaves for Flushing on a flush boundary, for Halted when the sink stops
    /// the scan, otherwise back to Scanning.
    AtLineEnd,

    /// Gives the sink the opportunity to flush buffered output, then returns
    /// to Scanning.
    Flushing,

    /// The read area is exhausted: carry the tail of the current line into the
    /// prefix area and refill. Synthesizes the final newline at end of input.
    ///
    /// Leaves for Scanning when bytes are available, for Halted otherwise.
    Draining,

    /// End of input, or the sink stopped the scan. Terminal.
    Halted,
}

/// One scan of one input through a compiled matcher.
pub(crate) struct ScanDriver<'m, R> {
    nfa: &'m mut Nfa,
    dfa: &'m mut LazyDfa,
    s: StateID,
    case_fold: bool,
    invert: bool,
    reader: R,
    // [0, WINDOW) is the prefix area, [WINDOW, 2 * WINDOW) the read area.
    buf: Vec<u8>,
    // Start of the current line.
    bol: usize,
    // Next byte to consume.
    pos: usize,
    // End of buffered data.
    end: usize,
    lineno: u64,
    count: u64,
    // The most recent input byte was a newline.
    nl: bool,
    // No input bytes at all were read.
    empty: bool,
    // The synthetic final newline has been delivered.
    eof: bool,
    state: ScanState,
}

impl<'m, R: Read> ScanDriver<'m, R> {
    pub(crate) fn new(
        nfa: &'m mut Nfa,
        dfa: &'m mut LazyDfa,
        seed: StateID,
        case_fold: bool,
        invert: bool,
        reader: R,
    ) -> Self {
        Self {
            nfa,
            dfa,
            s: seed,
            case_fold,
            invert,
            reader,
            buf: vec![0; 2 * WINDOW],
            bol: WINDOW,
            pos: WINDOW,
            end: WINDOW,
            lineno: 0,
            count: 0,
            nl: false,
            empty: true,
            eof: false,
            state: ScanState::Draining,
        }
    }

    pub(crate) fn run<S: LineSink>(mut self, sink: &mut S) -> Result<ScanSummary> {
        while self.state != ScanState::Halted {
            match self.state {
                ScanState::Scanning => {
                    if self.case_fold {
                        self.scan_bytes::<true>();
                    } else {
                        self.scan_bytes::<false>();
                    }
                }
                ScanState::AtLineEnd => self.line_end(sink),
                ScanState::Flushing => {
                    sink.flush();
                    self.state = ScanState::Scanning;
                }
                ScanState::Draining => self.drain()?,
                ScanState::Halted => break,
            }
        }
        debug!(
            "scan done: {} lines, {} hits, {} dfa states",
            self.lineno,
            self.count,
            self.dfa.state_count()
        );
        Ok(ScanSummary {
            lines: self.lineno,
            matched: self.count,
        })
    }

    /// The hot loop: steps buffered bytes through the DFA until a newline or
    /// the end of the buffered data. Case folding is a separate monomorphized
    /// copy so the common path carries no fold branch.
    fn scan_bytes<const FOLD: bool>(&mut self) {
        while self.pos < self.end {
            let mut byte = self.buf[self.pos];
            if FOLD && byte.is_ascii_uppercase() {
                byte = byte.to_ascii_lowercase();
            }
            self.s = self.dfa.step(self.nfa, self.s, byte);
            self.pos += 1;
            if byte == b'\n' {
                self.state = ScanState::AtLineEnd;
                return;
            }
        }
        self.state = ScanState::Draining;
    }

    /// Decides and reports the line just terminated at `pos`.
    fn line_end<S: LineSink>(&mut self, sink: &mut S) {
        self.lineno += 1;
        let hit = self.dfa.matched(self.s) != self.invert;
        let mut keep_going = true;
        if hit {
            self.count += 1;
            let line = LineMatch::new(self.lineno, &self.buf[self.bol..self.pos - 1], self.eof);
            keep_going = sink.on_line(&line);
        }
        self.bol = self.pos;
        self.state = if !keep_going {
            ScanState::Halted
        } else if self.lineno & FLUSH_MASK == 0 {
            ScanState::Flushing
        } else {
            ScanState::Scanning
        };
    }

    /// Carries the tail of the current line into the prefix area and refills
    /// the read area. At end of input, synthesizes the newline of a non-empty
    /// unterminated last line once, then halts.
    fn drain(&mut self) -> Result<()> {
        let carry = (self.pos - self.bol).min(WINDOW);
        self.buf.copy_within(self.pos - carry..self.pos, WINDOW - carry);
        self.bol = WINDOW - carry;
        self.pos = WINDOW;
        self.end = WINDOW;

        let n = self.reader.read(&mut self.buf[WINDOW..2 * WINDOW])?;
        if n > 0 {
            self.empty = false;
            self.nl = self.buf[WINDOW + n - 1] == b'\n';
            self.end = WINDOW + n;
            self.state = ScanState::Scanning;
        } else if !self.eof && !self.nl && !self.empty {
            self.buf[WINDOW] = b'\n';
            self.end = WINDOW + 1;
            self.eof = true;
            self.state = ScanState::Scanning;
        } else {
            self.state = ScanState::Halted;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::{case_dispatch, parse_patterns, MatchConfig};
    use std::io::Cursor;

    fn engine(patterns: &[&str], config: &MatchConfig) -> (Nfa, LazyDfa, StateID) {
        let mut nfa = Nfa::new();
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        let root = parse_patterns(&mut nfa, &patterns, config).unwrap();
        let root = case_dispatch::apply(&mut nfa, root);
        let mut dfa = LazyDfa::new();
        let seed = dfa.seed(&mut nfa, root);
        (nfa, dfa, seed)
    }

    fn scan_collect(
        patterns: &[&str],
        config: &MatchConfig,
        input: &[u8],
    ) -> (ScanSummary, Vec<(u64, Vec<u8>, bool)>) {
        let (mut nfa, mut dfa, seed) = engine(patterns, config);
        let mut hits = Vec::new();
        let mut sink = |m: &LineMatch<'_>| {
            hits.push((m.line_number(), m.as_bytes().to_vec(), m.is_unterminated()));
            true
        };
        let driver = ScanDriver::new(
            &mut nfa,
            &mut dfa,
            seed,
            config.case_fold,
            config.invert,
            Cursor::new(input.to_vec()),
        );
        let summary = driver.run(&mut sink).unwrap();
        (summary, hits)
    }

    #[test]
    fn test_reports_matching_lines_in_order() {
        let (summary, hits) = scan_collect(&["a"], &MatchConfig::default(), b"apple\nbanana\ncherry\n");
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.matched, 2);
        assert_eq!(hits[0], (1, b"apple".to_vec(), false));
        assert_eq!(hits[1], (2, b"banana".to_vec(), false));
    }

    #[test]
    fn test_unterminated_last_line_is_synthesized() {
        let (summary, hits) = scan_collect(&["c"], &MatchConfig::default(), b"ab\ncd");
        assert_eq!(summary.lines, 2);
        assert_eq!(hits, vec![(2, b"cd".to_vec(), true)]);
        // A trailing newline in the input must not produce a phantom line.
        let (summary, hits) = scan_collect(&["c"], &MatchConfig::default(), b"ab\ncd\n");
        assert_eq!(summary.lines, 2);
        assert_eq!(hits, vec![(2, b"cd".to_vec(), false)]);
    }

    #[test]
    fn test_empty_input_has_no_lines() {
        let (summary, hits) = scan_collect(&["a"], &MatchConfig::default(), b"");
        assert_eq!(summary, ScanSummary::default());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_invert_reports_the_complement() {
        let config = MatchConfig {
            invert: true,
            ..Default::default()
        };
        let (summary, hits) = scan_collect(&["a"], &config, b"apple\nxyz\nbar\n");
        assert_eq!(summary.matched, 1);
        assert_eq!(hits, vec![(2, b"xyz".to_vec(), false)]);
    }

    #[test]
    fn test_case_fold_covers_input_and_pattern() {
        let config = MatchConfig {
            case_fold: true,
            ..Default::default()
        };
        let (_, hits) = scan_collect(&["Apple"], &config, b"APPLE\napple\nnope\n");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_sink_cancels_at_a_line_boundary() {
        let (mut nfa, mut dfa, seed) = engine(&["a"], &MatchConfig::default());
        let mut seen = 0;
        let mut sink = |_: &LineMatch<'_>| {
            seen += 1;
            false
        };
        let driver = ScanDriver::new(
            &mut nfa,
            &mut dfa,
            seed,
            false,
            false,
            Cursor::new(b"a\na\na\n".to_vec()),
        );
        let summary = driver.run(&mut sink).unwrap();
        assert_eq!(seen, 1);
        assert_eq!(summary.matched, 1);
        assert!(summary.lines < 3);
    }

    #[test]
    fn test_sink_flush_fires_on_long_scans() {
        struct CountingSink {
            flushes: usize,
        }
        impl LineSink for CountingSink {
            fn on_line(&mut self, _: &LineMatch<'_>) -> bool {
                true
            }
            fn flush(&mut self) {
                self.flushes += 1;
            }
        }
        let (mut nfa, mut dfa, seed) = engine(&["x"], &MatchConfig::default());
        let input: Vec<u8> = b"x\n".repeat(600);
        let mut sink = CountingSink { flushes: 0 };
        let driver = ScanDriver::new(&mut nfa, &mut dfa, seed, false, false, Cursor::new(input));
        let summary = driver.run(&mut sink).unwrap();
        assert_eq!(summary.matched, 600);
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn test_long_line_keeps_its_last_window() {
        // A line far longer than both buffer halves: the reported bytes are the
        // trailing window of the line only.
        let long = vec![b'a'; 40 * 1024];
        let mut input = long.clone();
        input.push(b'\n');
        let (summary, hits) = scan_collect(&["a+"], &MatchConfig::default(), &input);
        assert_eq!(summary.matched, 1);
        let (lineno, bytes, _) = &hits[0];
        assert_eq!(*lineno, 1);
        assert_eq!(bytes.len(), 40 * 1024 - WINDOW);
        assert!(bytes.iter().all(|&b| b == b'a'));
    }

    #[test]
    fn test_line_spanning_a_refill_is_intact() {
        // A matching line that straddles the read boundary is carried over and
        // reported whole.
        let mut input = vec![b'x'; WINDOW - 3];
        input.extend_from_slice(b"needle");
        input.push(b'\n');
        let (_, hits) = scan_collect(&["needle"], &MatchConfig::default(), &input);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.len(), WINDOW - 3 + 6);
    }
}
