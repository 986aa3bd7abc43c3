//! Lazy, windowed access to sample data.
//!
//! The classification engine never receives the sample buffer itself. It
//! receives a `SignalView`: the buffer's total length bound to a bounded
//! accessor, through which the engine pulls only the slice it is currently
//! working on. On a device the buffer lives in flash and would not fit in
//! RAM twice; the same contract keeps host runs honest about it.
//!
//! A view is built fresh for every classifier invocation. It can carry a
//! `CancelToken` and a deadline, so an engine that is stuck pulling samples
//! fails its next read instead of running forever.

mod cancel;
mod source;

pub use cancel::CancelToken;
pub use source::{SampleSource, SlidingWindow};

use crate::error::SignalError;
use std::fmt;
use std::time::Instant;

/// Total length plus bounded accessor over a `SampleSource`.
pub struct SignalView<'a> {
    source: &'a dyn SampleSource,
    total_length: usize,
    cancel: Option<&'a CancelToken>,
    deadline: Option<Instant>,
}

impl<'a> SignalView<'a> {
    pub fn new(source: &'a dyn SampleSource) -> Self {
        Self {
            source,
            total_length: source.total_length(),
            cancel: None,
            deadline: None,
        }
    }

    /// Fail every read once `token` is cancelled.
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fail every read issued at or after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Copy `out.len()` values starting at `offset` into `out`.
    pub fn get_data(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(SignalError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(SignalError::DeadlineExceeded);
        }
        SignalError::check_range(offset, out.len(), self.total_length)?;
        self.source.read_into(offset, out)
    }

    /// Read a window into a freshly allocated buffer.
    pub fn read(&self, offset: usize, length: usize) -> Result<Vec<f32>, SignalError> {
        SignalError::check_range(offset, length, self.total_length)?;
        let mut out = vec![0.0; length];
        self.get_data(offset, &mut out)?;
        Ok(out)
    }
}

impl fmt::Debug for SignalView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalView")
            .field("total_length", &self.total_length)
            .field("cancellable", &self.cancel.is_some())
            .field("deadline", &self.deadline)
            .finish()
    }
}
