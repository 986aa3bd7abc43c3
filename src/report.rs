//! Line-oriented text report.
//!
//! The format is stable so tooling can grep it:
//!
//! ```text
//! Edge Impulse standalone inferencing (host)
//! run_classifier returned: 0
//! Predictions (DSP: 12 ms., Classification: 1 ms., Anomaly: 0 ms.):
//! [0.00000, 0.00000, 0.99609, 0.00391, -0.316]
//! ```
//!
//! Scores use five decimals. The anomaly score uses three and is only
//! present when the impulse has an anomaly block.

use crate::engine::ImpulseStatus;
use crate::types::{ClassificationResult, Timing};
use std::fmt;
use std::io::{self, Write};

pub const BANNER_PREFIX: &str = "Edge Impulse standalone inferencing";

pub fn banner(target: &str) -> String {
    format!("{BANNER_PREFIX} ({target})")
}

pub fn status_line(status: ImpulseStatus) -> String {
    format!("run_classifier returned: {}", status.code())
}

pub fn timing_line(timing: &Timing) -> String {
    format!(
        "Predictions (DSP: {} ms., Classification: {} ms., Anomaly: {} ms.): ",
        timing.dsp, timing.classification, timing.anomaly
    )
}

pub fn scores_line(result: &ClassificationResult, has_anomaly: bool) -> String {
    let mut parts: Vec<String> = result
        .classification
        .iter()
        .map(|c| format!("{:.5}", c.value))
        .collect();
    if has_anomaly {
        parts.push(format!("{:.3}", result.anomaly.unwrap_or(0.0)));
    }
    format!("[{}]", parts.join(", "))
}

/// Timing and scores for one successful invocation.
pub struct Report<'a> {
    pub result: &'a ClassificationResult,
    pub has_anomaly: bool,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", timing_line(&self.result.timing))?;
        writeln!(f, "{}", scores_line(self.result, self.has_anomaly))
    }
}

pub fn write_report<W: Write + ?Sized>(
    out: &mut W,
    result: &ClassificationResult,
    has_anomaly: bool,
) -> io::Result<()> {
    write!(
        out,
        "{}",
        Report {
            result,
            has_anomaly
        }
    )?;
    out.flush()
}
