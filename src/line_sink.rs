use crate::LineMatch;

/// The consumer side of a scan.
///
/// A matcher drives the scan loop and hands every hit line to the sink. The sink is
/// where all result formatting lives; the matching core never writes output itself.
pub trait LineSink {
    /// Called once per hit line, in input order.
    /// Return `false` to stop the scan at this line boundary.
    fn on_line(&mut self, line: &LineMatch<'_>) -> bool;

    /// Called periodically (every 512 lines) so that buffered output can be flushed
    /// on long scans. The default does nothing.
    fn flush(&mut self) {}
}

/// Any `FnMut(&LineMatch) -> bool` is a sink.
impl<F> LineSink for F
where
    F: FnMut(&LineMatch<'_>) -> bool,
{
    fn on_line(&mut self, line: &LineMatch<'_>) -> bool {
        self(line)
    }
}
