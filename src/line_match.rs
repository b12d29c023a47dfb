/// A line that matched, as reported to a [crate::LineSink].
///
/// The borrowed bytes live in the scanner's read buffer and are only valid for the
/// duration of the sink callback. Lines longer than the scanner's window (32 KiB)
/// are reported as their trailing window only.
#[derive(Debug, Clone, Copy)]
pub struct LineMatch<'a> {
    line_number: u64,
    bytes: &'a [u8],
    eof: bool,
}

impl<'a> LineMatch<'a> {
    pub(crate) fn new(line_number: u64, bytes: &'a [u8], eof: bool) -> Self {
        LineMatch {
            line_number,
            bytes,
            eof,
        }
    }

    /// The 1-based line number of the matched line.
    #[inline]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// The bytes of the matched line, without the terminating newline.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// True if the line had no terminating newline in the input, i.e. it is an
    /// unterminated last line whose terminator was synthesized at end of input.
    /// Formatters can use this to reproduce the input byte-for-byte.
    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.eof
    }
}

impl std::fmt::Display for LineMatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.line_number,
            String::from_utf8_lossy(self.bytes)
        )
    }
}

/// The result of scanning one input through a [crate::Matcher].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// The number of lines read, counting an unterminated last line.
    pub lines: u64,
    /// The number of lines that were hits, after inversion if configured.
    pub matched: u64,
}

impl ScanSummary {
    /// True if at least one line was a hit.
    #[inline]
    pub fn is_match(&self) -> bool {
        self.matched != 0
    }
}
