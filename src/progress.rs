//! Coarse progress notification.

/// Default number of points between two progress reports.
pub const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Receives `(points_done, points_total)` from the decode loop.
///
/// Called synchronously after every full interval of points. There is no final
/// report for a trailing partial interval, completion is signalled by the decode
/// call returning.
pub trait ProgressSink {
    fn report(&mut self, points_done: u64, points_total: u64);
}

impl<F: FnMut(u64, u64)> ProgressSink for F {
    fn report(&mut self, points_done: u64, points_total: u64) {
        self(points_done, points_total)
    }
}

/// A sink that drops every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _points_done: u64, _points_total: u64) {}
}

/// Fires the sink every `interval` points.
pub(crate) struct ProgressReporter<'a> {
    sink: &'a mut dyn ProgressSink,
    interval: u64,
    total: u64,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink, interval: u64, total: u64) -> Self {
        ProgressReporter {
            sink,
            interval,
            total,
        }
    }

    /// Called once `points_done` points have been processed.
    #[inline]
    pub(crate) fn point_done(&mut self, points_done: u64) {
        if self.interval > 0 && points_done % self.interval == 0 {
            self.sink.report(points_done, self.total);
        }
    }
}
