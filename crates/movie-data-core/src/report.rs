use std::sync::Mutex;
use tracing::warn;

/// Channel for failures an operation swallows instead of returning
///
/// Review sync never fails towards its caller; whatever went wrong ends up here.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, operation: &'static str, error: &anyhow::Error);
}

/// Reports failures as structured log events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, operation: &'static str, error: &anyhow::Error) {
        warn!(operation, error = %error, "Operation failed in the background");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub operation: &'static str,
    pub message: String,
}

/// Keeps every reported failure for later inspection, and logs it as well
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reported: Mutex<Vec<ReportedError>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reported(&self) -> Vec<ReportedError> {
        self.reported.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<ReportedError> {
        self.reported
            .lock()
            .map(|mut r| std::mem::take(&mut *r))
            .unwrap_or_default()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, operation: &'static str, error: &anyhow::Error) {
        TracingReporter.report(operation, error);
        if let Ok(mut reported) = self.reported.lock() {
            reported.push(ReportedError {
                operation,
                message: format!("{:#}", error),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter_keeps_order() {
        let reporter = CollectingReporter::new();
        reporter.report("first", &anyhow::anyhow!("boom"));
        reporter.report("second", &anyhow::anyhow!("bang"));

        let reported = reporter.reported();
        assert_eq!(reported.len(), 2);
        assert_eq!(reported[0].operation, "first");
        assert_eq!(reported[1].message, "bang");

        assert_eq!(reporter.take().len(), 2);
        assert!(reporter.reported().is_empty());
    }
}
