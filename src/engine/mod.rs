//! Engine abstraction for the classification pipeline
//!
//! The harness treats the impulse (DSP, classifier and anomaly blocks) as a
//! black box behind the `ImpulseEngine` trait. Two engines are provided:
//!
//! - **Replay Engine**: a pure-Rust stand-in that pulls the signal like the
//!   real SDK does and answers with scores recorded in a JSON fixture
//! - **FFI Engine**: direct calls into a C shim around the Edge Impulse C++
//!   SDK's `run_classifier` (requires the `ffi` feature)

use crate::error::HarnessError;
use crate::signal::SignalView;
use crate::types::{ClassificationResult, ImpulseParameters};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub mod replay;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use replay::{ReplayEngine, ReplayFixture, ReplayResponse};

/// Status code returned by `run_classifier`.
///
/// Named variants cover the codes the SDK documents; anything else is kept
/// verbatim in `Other`. The driver only ever checks `is_ok()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpulseStatus {
    Ok,
    ShapesDontMatch,
    Canceled,
    TfliteError,
    DspError,
    TfliteArenaAllocFailed,
    CubeaiError,
    AllocFailed,
    OnlySupportedForImages,
    UnsupportedInferencingEngine,
    OutOfMemory,
    InputTensorWasNull,
    OutputTensorWasNull,
    Other(i32),
}

impl ImpulseStatus {
    pub fn code(self) -> i32 {
        match self {
            ImpulseStatus::Ok => 0,
            ImpulseStatus::ShapesDontMatch => -1,
            ImpulseStatus::Canceled => -2,
            ImpulseStatus::TfliteError => -3,
            ImpulseStatus::DspError => -5,
            ImpulseStatus::TfliteArenaAllocFailed => -6,
            ImpulseStatus::CubeaiError => -7,
            ImpulseStatus::AllocFailed => -8,
            ImpulseStatus::OnlySupportedForImages => -9,
            ImpulseStatus::UnsupportedInferencingEngine => -10,
            ImpulseStatus::OutOfMemory => -11,
            ImpulseStatus::InputTensorWasNull => -13,
            ImpulseStatus::OutputTensorWasNull => -14,
            ImpulseStatus::Other(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == ImpulseStatus::Ok
    }
}

impl From<i32> for ImpulseStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ImpulseStatus::Ok,
            -1 => ImpulseStatus::ShapesDontMatch,
            -2 => ImpulseStatus::Canceled,
            -3 => ImpulseStatus::TfliteError,
            -5 => ImpulseStatus::DspError,
            -6 => ImpulseStatus::TfliteArenaAllocFailed,
            -7 => ImpulseStatus::CubeaiError,
            -8 => ImpulseStatus::AllocFailed,
            -9 => ImpulseStatus::OnlySupportedForImages,
            -10 => ImpulseStatus::UnsupportedInferencingEngine,
            -11 => ImpulseStatus::OutOfMemory,
            -13 => ImpulseStatus::InputTensorWasNull,
            -14 => ImpulseStatus::OutputTensorWasNull,
            other => ImpulseStatus::Other(other),
        }
    }
}

impl From<ImpulseStatus> for i32 {
    fn from(status: ImpulseStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ImpulseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpulseStatus::Ok => write!(f, "Operation completed successfully"),
            ImpulseStatus::ShapesDontMatch => {
                write!(f, "Input shapes don't match expected dimensions")
            }
            ImpulseStatus::Canceled => write!(f, "Operation was canceled"),
            ImpulseStatus::TfliteError => write!(f, "TensorFlow Lite error"),
            ImpulseStatus::DspError => write!(f, "Error in DSP block or reading sensor data"),
            ImpulseStatus::TfliteArenaAllocFailed => {
                write!(f, "TensorFlow Lite arena allocation failed")
            }
            ImpulseStatus::CubeaiError => write!(f, "Cube.AI error"),
            ImpulseStatus::AllocFailed => write!(f, "Memory allocation failed"),
            ImpulseStatus::OnlySupportedForImages => write!(f, "Only image input is supported"),
            ImpulseStatus::UnsupportedInferencingEngine => {
                write!(f, "Unsupported inferencing engine")
            }
            ImpulseStatus::OutOfMemory => write!(f, "Out of memory"),
            ImpulseStatus::InputTensorWasNull => write!(f, "Input tensor was null"),
            ImpulseStatus::OutputTensorWasNull => write!(f, "Output tensor was null"),
            ImpulseStatus::Other(code) => write!(f, "Unknown error {code}"),
        }
    }
}

/// Configuration for the different engine types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EngineConfig {
    /// Fixture-driven stand-in engine
    Replay {
        /// Path to a JSON fixture; the built-in fixture is used when absent
        #[serde(default)]
        fixture: Option<PathBuf>,
    },
    /// Compiled-in impulse via the C shim
    Ffi,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::Replay { fixture: None }
    }
}

/// Trait for classification engines
pub trait ImpulseEngine {
    /// Constants describing what the impulse expects and produces
    fn parameters(&self) -> &ImpulseParameters;

    /// Run the full impulse over `signal`, writing into `result`.
    ///
    /// Blocks until the engine is done. `result` has already been reset by
    /// the caller and is only meaningful when the returned status is `Ok`.
    fn run_classifier(
        &mut self,
        signal: &SignalView<'_>,
        result: &mut ClassificationResult,
        debug: bool,
    ) -> ImpulseStatus;
}

impl<E: ImpulseEngine + ?Sized> ImpulseEngine for Box<E> {
    fn parameters(&self) -> &ImpulseParameters {
        (**self).parameters()
    }

    fn run_classifier(
        &mut self,
        signal: &SignalView<'_>,
        result: &mut ClassificationResult,
        debug: bool,
    ) -> ImpulseStatus {
        (**self).run_classifier(signal, result, debug)
    }
}

/// Factory function to create the configured engine
pub fn create_engine(config: &EngineConfig) -> Result<Box<dyn ImpulseEngine>, HarnessError> {
    match config {
        EngineConfig::Replay {
            fixture: Some(path),
        } => Ok(Box::new(ReplayEngine::from_file(path)?)),
        EngineConfig::Replay { fixture: None } => Ok(Box::new(ReplayEngine::builtin()?)),
        #[cfg(feature = "ffi")]
        EngineConfig::Ffi => Ok(Box::new(ffi::FfiEngine::new()?)),
        #[cfg(not(feature = "ffi"))]
        EngineConfig::Ffi => Err(HarnessError::InvalidConfig(
            "FFI engine not enabled. Enable the 'ffi' feature.".to_string(),
        )),
    }
}
