//! Common types shared by the harness, the engines and the report.
//!
//! `ImpulseParameters` describes what the classification engine was built
//! for (the constants the C SDK exposes as `EI_CLASSIFIER_*` macros), and
//! `ClassificationResult` is the single output slot the driver hands to the
//! engine on every invocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters that define what an impulse expects and produces.
///
/// On a device these are compile-time constants of the deployed model. Here
/// they are runtime data so that both the anomaly and non-anomaly report
/// paths can be exercised from one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpulseParameters {
    /// Number of raw values one classification pass consumes
    pub input_frame_size: usize,
    /// Values per time step (e.g., 3 for an xyz accelerometer)
    #[serde(default = "default_samples_per_frame")]
    pub raw_samples_per_frame: usize,
    /// Time interval between samples in milliseconds
    #[serde(default)]
    pub interval_ms: f32,
    /// Sampling frequency in Hz
    #[serde(default)]
    pub frequency: f32,
    /// Classification labels, in the order the engine reports scores
    pub labels: Vec<String>,
    /// Whether the impulse contains an anomaly block
    #[serde(default)]
    pub has_anomaly: bool,
    /// Type of input sensor (see `SensorType`)
    #[serde(default = "default_sensor")]
    pub sensor: i32,
}

fn default_samples_per_frame() -> usize {
    1
}

fn default_sensor() -> i32 {
    -1
}

impl ImpulseParameters {
    /// Number of classification labels.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn sensor_type(&self) -> SensorType {
        SensorType::from(self.sensor)
    }
}

/// Represents the type of sensor used for data collection.
///
/// Maps to the numeric values used by the SDK:
/// - -1 or unknown: Unknown
/// - 1: Microphone
/// - 2: Accelerometer
/// - 3: Camera
/// - 4: Positional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorType {
    Unknown = -1,
    Microphone = 1,
    Accelerometer = 2,
    Camera = 3,
    Positional = 4,
}

impl From<i32> for SensorType {
    fn from(value: i32) -> Self {
        match value {
            1 => SensorType::Microphone,
            2 => SensorType::Accelerometer,
            3 => SensorType::Camera,
            4 => SensorType::Positional,
            _ => SensorType::Unknown,
        }
    }
}

/// Time spent in each stage of one classifier invocation, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Digital signal processing (feature extraction)
    #[serde(default)]
    pub dsp: i32,
    /// Neural network / classifier inference
    #[serde(default)]
    pub classification: i32,
    /// Anomaly scoring
    #[serde(default)]
    pub anomaly: i32,
}

/// A label and the confidence score the classifier assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub value: f32,
}

/// Output slot filled by the engine on every invocation.
///
/// The driver owns exactly one of these and resets it before each call, so
/// a failed invocation never leaves scores from the previous pass behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationResult {
    pub timing: Timing,
    /// Per-label scores in the impulse's label order
    pub classification: Vec<Classification>,
    /// Anomaly score, present only when the impulse has an anomaly block
    pub anomaly: Option<f32>,
}

impl ClassificationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the slot in place, keeping its allocation for the next pass.
    pub fn reset(&mut self) {
        self.timing = Timing::default();
        self.classification.clear();
        self.anomaly = None;
    }

    /// The label with the highest score, if any.
    pub fn top(&self) -> Option<&Classification> {
        self.classification
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timing: dsp={} ms, classification={} ms, anomaly={} ms",
            self.dsp, self.classification, self.anomaly
        )
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.4}", self.label, self.value)
    }
}
