//! Error types for the standalone harness.
//!
//! This module defines the errors that can occur while validating the sample
//! buffer against the impulse, pulling samples through a signal, and driving
//! the classifier. The driver only ever recovers from an error by reporting
//! it and stopping, so every variant carries enough context for an operator
//! to diagnose the failure from the message alone.
//!
//! The main error type is `HarnessError`. Reads through a signal fail with the
//! narrower `SignalError`, which converts into `HarnessError`.

use thiserror::Error;

/// Represents all possible errors that can occur in the harness.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The sample buffer length does not match the impulse input frame size.
    ///
    /// This is detected once, before the first classifier invocation. Nothing
    /// at runtime can fix it, so the run ends immediately.
    #[error(
        "The size of your 'features' array is not correct. Expected {expected} items, but had {actual}"
    )]
    Configuration {
        /// Input frame size the impulse was built for
        expected: usize,
        /// Number of values the sample source holds
        actual: usize,
    },

    /// The classifier returned a non-success status.
    ///
    /// The code is surfaced verbatim; the harness does not interpret it.
    #[error("run_classifier failed with status {status}")]
    EngineInvocation {
        /// Raw status code returned by the engine
        status: i32,
    },

    /// Indicates that a configuration file or option is invalid.
    ///
    /// This error occurs when:
    /// - An option has an impossible value (e.g. a zero window stride)
    /// - An engine kind is selected that this build does not include
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Indicates that input data could not be used.
    ///
    /// This error occurs when:
    /// - A raw features file contains a token that is not a number
    /// - A replay fixture does not match its own parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Indicates a failure reading a features, fixture or config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Indicates a failure decoding a JSON config or fixture.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A read through a signal view failed outside of an engine call.
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Errors returned by a bounded read through a sample source or signal view.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    /// The requested window does not lie within `[0, total_length)`.
    #[error("read of {length} values at offset {offset} is outside a signal of {total_length} values")]
    OutOfRange {
        offset: usize,
        length: usize,
        total_length: usize,
    },

    /// The run was cancelled while the engine was pulling samples.
    #[error("signal read cancelled")]
    Cancelled,

    /// The invocation deadline passed while the engine was pulling samples.
    #[error("signal read past the invocation deadline")]
    DeadlineExceeded,
}

impl SignalError {
    /// Validate a `(offset, length)` window against a total length.
    pub fn check_range(
        offset: usize,
        length: usize,
        total_length: usize,
    ) -> Result<(), SignalError> {
        match offset.checked_add(length) {
            Some(end) if end <= total_length => Ok(()),
            _ => Err(SignalError::OutOfRange {
                offset,
                length,
                total_length,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_names_both_sizes() {
        let err = HarnessError::Configuration {
            expected: 375,
            actual: 372,
        };
        assert_eq!(
            err.to_string(),
            "The size of your 'features' array is not correct. Expected 375 items, but had 372"
        );
    }

    #[test]
    fn test_check_range_bounds() {
        assert!(SignalError::check_range(0, 10, 10).is_ok());
        assert!(SignalError::check_range(10, 0, 10).is_ok());
        assert_eq!(
            SignalError::check_range(5, 6, 10),
            Err(SignalError::OutOfRange {
                offset: 5,
                length: 6,
                total_length: 10
            })
        );
        assert!(SignalError::check_range(11, 0, 10).is_err());
    }

    #[test]
    fn test_check_range_overflow_is_out_of_range() {
        assert!(SignalError::check_range(usize::MAX, 2, 10).is_err());
    }

    #[test]
    fn test_signal_error_converts() {
        let err: HarnessError = SignalError::Cancelled.into();
        assert!(matches!(err, HarnessError::Signal(SignalError::Cancelled)));
    }
}
