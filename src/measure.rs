//! Explicit timed-operation measurement.
//!
//! A failed operation keeps the elapsed time up to the failure, but the
//! result surfaces the failure instead of passing the elapsed time off as a
//! valid latency sample.

use crate::{StoreError, StoreResult};
use std::time::{Duration, Instant};

/// One timing cell of a result matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Ok(Duration),
    /// Sentinel for a failed operation; carries the elapsed time up to the
    /// failure but is rendered as `FAIL`, never as a latency.
    Failed(Duration),
}

impl Sample {
    pub fn is_ok(&self) -> bool {
        matches!(self, Sample::Ok(_))
    }

    pub fn millis(&self) -> f64 {
        match self {
            Sample::Ok(d) | Sample::Failed(d) => d.as_secs_f64() * 1_000.0,
        }
    }
}

/// Error from a timed operation.
#[derive(Debug)]
pub struct TimedError {
    pub elapsed: Duration,
    pub source: StoreError,
}

/// Time one fallible operation with a monotonic clock.
pub fn timed<T>(op: impl FnOnce() -> StoreResult<T>) -> Result<(Duration, T), TimedError> {
    let start = Instant::now();
    match op() {
        Ok(value) => Ok((start.elapsed(), value)),
        Err(source) => Err(TimedError { elapsed: start.elapsed(), source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_yields_elapsed_and_value() {
        let (elapsed, value) = timed(|| Ok(7u32)).unwrap();
        assert_eq!(value, 7);
        assert!(elapsed <= Duration::from_secs(1));
    }

    #[test]
    fn failure_carries_elapsed_and_source() {
        let err = timed(|| -> StoreResult<()> { Err(StoreError::AuthorNotFound(3)) }).unwrap_err();
        assert!(matches!(err.source, StoreError::AuthorNotFound(3)));
        assert!(err.elapsed <= Duration::from_secs(1));
    }

    #[test]
    fn failed_sample_still_reports_millis() {
        let s = Sample::Failed(Duration::from_millis(12));
        assert!(!s.is_ok());
        assert!((s.millis() - 12.0).abs() < 0.01);
    }
}
