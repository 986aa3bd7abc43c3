//! The classification driver.
//!
//! `ClassificationDriver` validates the sample source against the engine
//! once, then repeatedly builds a fresh `SignalView`, invokes the engine,
//! checks its status and writes the report. It stops when the iteration
//! budget is spent or its `CancelToken` is cancelled, and returns an error
//! (after printing what it knows) on a size mismatch or a failed
//! invocation. It never retries.

use crate::engine::{ImpulseEngine, ImpulseStatus};
use crate::error::HarnessError;
use crate::report;
use crate::signal::{CancelToken, SampleSource, SignalView};
use crate::types::ClassificationResult;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Options controlling one run of the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Shown in the banner line
    pub target: String,
    /// Pause between a successful report and the next invocation
    pub interval: Duration,
    /// Passed through to every `run_classifier` call
    pub debug: bool,
    /// Stop after this many successful invocations; `None` runs until cancelled
    pub max_iterations: Option<u64>,
    /// Fail reads the engine issues after this much time in one invocation
    pub invocation_deadline: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target: "host".to_string(),
            interval: Duration::from_millis(2000),
            debug: true,
            max_iterations: None,
            invocation_deadline: None,
        }
    }
}

/// Why a run ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationBudget,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Successful invocations performed
    pub iterations: u64,
    pub stop_reason: StopReason,
}

pub struct ClassificationDriver<E, S, W> {
    engine: E,
    source: S,
    out: W,
    options: RunOptions,
    cancel: CancelToken,
    result: ClassificationResult,
    validated: bool,
}

impl<E, S, W> ClassificationDriver<E, S, W>
where
    E: ImpulseEngine,
    S: SampleSource,
    W: Write,
{
    pub fn new(engine: E, source: S, out: W, options: RunOptions) -> Self {
        Self {
            engine,
            source,
            out,
            options,
            cancel: CancelToken::new(),
            result: ClassificationResult::new(),
            validated: false,
        }
    }

    /// Use an externally owned token, e.g. one cancelled from another thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Result slot of the last invocation.
    pub fn result(&self) -> &ClassificationResult {
        &self.result
    }

    /// Check the sample source length against the impulse input size.
    ///
    /// Never touches the source's samples, only its length.
    pub fn validate(&mut self) -> Result<(), HarnessError> {
        let expected = self.engine.parameters().input_frame_size;
        let actual = self.source.total_length();
        if expected != actual {
            let err = HarnessError::Configuration { expected, actual };
            error!("{}", err);
            writeln!(self.out, "{err}")?;
            self.out.flush()?;
            return Err(err);
        }

        debug!("Sample source holds {} values, matching the impulse", actual);
        self.validated = true;
        Ok(())
    }

    /// Run one invocation and write its report.
    ///
    /// Validates first if that has not happened yet. On a non-success status
    /// only the status line is written.
    pub fn step(&mut self) -> Result<ImpulseStatus, HarnessError> {
        if !self.validated {
            self.validate()?;
        }

        self.result.reset();
        let started = Instant::now();
        let status = {
            let mut signal = SignalView::new(&self.source).with_cancel(&self.cancel);
            if let Some(deadline) = self.options.invocation_deadline {
                signal = signal.with_deadline(started + deadline);
            }
            self.engine
                .run_classifier(&signal, &mut self.result, self.options.debug)
        };
        debug!(
            "run_classifier finished in {:?} with status {}",
            started.elapsed(),
            status.code()
        );

        writeln!(self.out, "{}", report::status_line(status))?;

        if !status.is_ok() {
            error!("run_classifier failed ({}): {}", status.code(), status);
            self.out.flush()?;
            return Err(HarnessError::EngineInvocation {
                status: status.code(),
            });
        }

        if let Some(top) = self.result.top() {
            info!("Top prediction: {}", top);
        }
        let has_anomaly = self.engine.parameters().has_anomaly;
        report::write_report(&mut self.out, &self.result, has_anomaly)?;
        Ok(status)
    }

    /// Print the banner, validate, then loop until stopped.
    pub fn run(&mut self) -> Result<RunSummary, HarnessError> {
        writeln!(self.out, "{}", report::banner(&self.options.target))?;
        self.validate()?;

        info!(
            "Starting classification loop (interval {:?}, budget {:?})",
            self.options.interval, self.options.max_iterations
        );

        let mut iterations = 0;
        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if self.budget_spent(iterations) {
                break StopReason::IterationBudget;
            }

            match self.step() {
                Ok(_) => {}
                Err(HarnessError::EngineInvocation { status }) if self.cancel.is_cancelled() => {
                    info!("Invocation aborted by cancellation (status {})", status);
                    break StopReason::Cancelled;
                }
                Err(e) => return Err(e),
            }
            iterations += 1;

            if self.budget_spent(iterations) {
                break StopReason::IterationBudget;
            }
            if self.cancel.wait_timeout(self.options.interval) {
                break StopReason::Cancelled;
            }
            self.source.next_window();
        };

        info!(
            "Classification loop stopped after {} iterations: {:?}",
            iterations, stop_reason
        );
        Ok(RunSummary {
            iterations,
            stop_reason,
        })
    }

    fn budget_spent(&self, iterations: u64) -> bool {
        self.options
            .max_iterations
            .is_some_and(|max| iterations >= max)
    }
}
