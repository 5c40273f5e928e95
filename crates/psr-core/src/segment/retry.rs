use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Bounded retry for interactive steps.
///
/// One initial attempt plus `max_retries` retries; when all come back empty
/// the run fails with [`PipelineError::SegmentationFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Call `attempt` with 1-based attempt numbers until it yields a value.
    ///
    /// Errors from `attempt` abort immediately and are not retried.
    pub fn run<T, F>(&self, mut attempt: F) -> Result<T, PipelineError>
    where
        F: FnMut(u32) -> Result<Option<T>, PipelineError>,
    {
        let attempts = self.max_attempts();
        for n in 1..=attempts {
            if let Some(value) = attempt(n)? {
                return Ok(value);
            }
        }
        Err(PipelineError::SegmentationFailed { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_three_attempts() {
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let mut seen = Vec::new();
        let result: Result<(), _> = RetryPolicy::new(0).run(|n| {
            seen.push(n);
            Ok(None)
        });
        assert_eq!(seen, vec![1]);
        assert_eq!(result, Err(PipelineError::SegmentationFailed { attempts: 1 }));
    }

    #[test]
    fn test_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::default().run(|_| {
            calls += 1;
            Err(PipelineError::EmptyRaster)
        });
        assert_eq!(calls, 1);
        assert_eq!(result, Err(PipelineError::EmptyRaster));
    }
}
