//! Progress reporting and cooperative cancellation

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress updates and feedback from a running analysis and
/// exposes the caller's cancellation request.
pub trait Reporter {
    /// A labelled progress update, `percent` in `0..=100`.
    fn progress(&mut self, label: &str, percent: i32);

    /// A human-facing message (warnings, notices).
    fn feedback(&mut self, message: &str);

    /// Whether the caller has asked the analysis to stop.
    fn cancel_requested(&self) -> bool;
}

/// Reporter that discards everything and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn progress(&mut self, _label: &str, _percent: i32) {}

    fn feedback(&mut self, _message: &str) {}

    fn cancel_requested(&self) -> bool {
        false
    }
}

/// Shared cancellation flag, settable from another owner of the handle.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reporter that forwards progress and feedback to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LogReporter {
    cancel: CancelFlag,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter whose cancellation is driven by the given flag.
    pub fn with_cancel(cancel: CancelFlag) -> Self {
        Self { cancel }
    }
}

impl Reporter for LogReporter {
    fn progress(&mut self, label: &str, percent: i32) {
        tracing::debug!(label, percent, "progress");
    }

    fn feedback(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.is_set()
    }
}

/// Percent-throttled progress for one phase of a pipeline.
///
/// Updates reach the reporter only when the whole-percent value changes, and
/// the cancellation flag is polled at exactly those updates.
#[derive(Debug)]
pub struct Phase<'a> {
    label: &'a str,
    last_percent: i32,
}

impl<'a> Phase<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            last_percent: -1,
        }
    }

    /// Percent of `step` out of `total`, saturating on empty totals.
    pub fn percent(step: usize, total: usize) -> i32 {
        if total == 0 {
            return 100;
        }
        (100.0 * step as f64 / total as f64) as i32
    }

    /// Report `percent` if it changed; poll for cancellation when it did.
    pub fn update(&mut self, reporter: &mut dyn Reporter, percent: i32) -> Result<()> {
        if percent != self.last_percent {
            reporter.progress(self.label, percent);
            self.last_percent = percent;
            if reporter.cancel_requested() {
                return Err(Error::Cancelled);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        updates: Vec<(String, i32)>,
        cancel: bool,
    }

    impl Reporter for Recording {
        fn progress(&mut self, label: &str, percent: i32) {
            self.updates.push((label.to_string(), percent));
        }

        fn feedback(&mut self, _message: &str) {}

        fn cancel_requested(&self) -> bool {
            self.cancel
        }
    }

    #[test]
    fn phase_throttles_to_percent_changes() {
        let mut reporter = Recording::default();
        let mut phase = Phase::new("scan");

        for i in 0..1000 {
            phase
                .update(&mut reporter, Phase::percent(i, 1000))
                .unwrap();
        }

        assert_eq!(reporter.updates.len(), 100);
        assert_eq!(reporter.updates[0], ("scan".to_string(), 0));
        assert_eq!(reporter.updates.last().unwrap().1, 99);
    }

    #[test]
    fn phase_polls_cancellation_on_update() {
        let mut reporter = Recording {
            cancel: true,
            ..Default::default()
        };
        let mut phase = Phase::new("scan");

        let err = phase.update(&mut reporter, 0).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn cancel_flag_propagates() {
        let flag = CancelFlag::new();
        let reporter = LogReporter::with_cancel(flag.clone());
        assert!(!reporter.cancel_requested());
        flag.cancel();
        assert!(reporter.cancel_requested());
    }
}
