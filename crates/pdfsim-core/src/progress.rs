//! Progress reporting seam.
//!
//! The orchestrator reports one unit of work per completed comparison
//! pair through this trait. Progress is purely observational: no
//! implementation may alter what gets computed, only what gets shown.

/// Receiver for comparison progress events.
///
/// The orchestrator calls [`start`](ProgressSink::start) once with the
/// total number of pairs, [`advance`](ProgressSink::advance) once per
/// completed pair, and [`finish`](ProgressSink::finish) once at the end
/// of the run.
pub trait ProgressSink {
    /// Called once before the first pair, with the total unit count.
    fn start(&mut self, total: u64);

    /// Called once per completed comparison pair.
    fn advance(&mut self);

    /// Called once after the last pair.
    fn finish(&mut self);
}

/// Progress sink that discards all events.
///
/// Used in verbose console mode (where rows are echoed instead of a
/// bar) and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn start(&mut self, _total: u64) {}
    fn advance(&mut self) {}
    fn finish(&mut self) {}
}
