//! Harness configuration.
//!
//! Every field has a default matching the behaviour of the classic
//! standalone example: the compiled-in sample, a two second pause, debug
//! output on, no iteration budget. A JSON file can override any subset of
//! fields, and the command line overrides the file.

use crate::driver::RunOptions;
use crate::engine::EngineConfig;
use crate::error::HarnessError;
use crate::samples::{load_features, SAMPLE_FEATURES};
use crate::signal::{SampleSource, SlidingWindow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Shown in the banner line
    pub target: String,
    /// Pause between iterations in milliseconds
    pub interval_ms: u64,
    /// Passed through to every classifier call
    pub debug: bool,
    /// Optional iteration budget
    pub max_iterations: Option<u64>,
    /// Optional per-invocation deadline in milliseconds
    pub invocation_deadline_ms: Option<u64>,
    /// Raw features file; the compiled-in sample is used when absent
    pub features: Option<PathBuf>,
    /// Slide a frame-sized window over the features instead of reusing them
    pub window: Option<WindowConfig>,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Values to advance per iteration
    pub stride: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            target: "host".to_string(),
            interval_ms: 2000,
            debug: true,
            max_iterations: None,
            invocation_deadline_ms: None,
            features: None,
            window: None,
            engine: EngineConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        debug!("Loading harness configuration from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let config: HarnessConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.window.is_some_and(|w| w.stride == 0) {
            return Err(HarnessError::InvalidConfig(
                "window stride must be greater than zero".to_string(),
            ));
        }
        if self.invocation_deadline_ms == Some(0) {
            return Err(HarnessError::InvalidConfig(
                "invocation_deadline_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            target: self.target.clone(),
            interval: Duration::from_millis(self.interval_ms),
            debug: self.debug,
            max_iterations: self.max_iterations,
            invocation_deadline: self.invocation_deadline_ms.map(Duration::from_millis),
        }
    }

    /// Build the sample source for an impulse taking `frame_size` values.
    ///
    /// Without a window the source is the whole features buffer and its
    /// length is checked by the driver. A recording shorter than one frame
    /// cannot be windowed, so it is passed through whole and the driver's
    /// size check reports it like any other mismatch.
    pub fn build_source(&self, frame_size: usize) -> Result<Box<dyn SampleSource>, HarnessError> {
        let source: Box<dyn SampleSource> = match (&self.features, self.window) {
            (None, Some(window)) if SAMPLE_FEATURES.len() >= frame_size => Box::new(
                SlidingWindow::new(&SAMPLE_FEATURES[..], frame_size, window.stride)?,
            ),
            (None, _) => Box::new(&SAMPLE_FEATURES),
            (Some(path), window) => {
                let recording = load_features(path)?;
                match window {
                    Some(window) if recording.len() >= frame_size => {
                        Box::new(SlidingWindow::new(recording, frame_size, window.stride)?)
                    }
                    Some(_) => {
                        debug!(
                            "Recording of {} values is shorter than one frame, not windowing",
                            recording.len()
                        );
                        Box::new(recording)
                    }
                    None => Box::new(recording),
                }
            }
        };
        debug!("Sample source exposes {} values", source.total_length());
        Ok(source)
    }

    /// Merge command-line values over this configuration.
    ///
    /// Only values that were given replace the file's. Selecting the FFI
    /// engine wins over a replay fixture.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(features) = overrides.features {
            self.features = Some(features);
        }
        if overrides.ffi {
            self.engine = EngineConfig::Ffi;
        } else if let Some(fixture) = overrides.fixture {
            self.engine = EngineConfig::Replay {
                fixture: Some(fixture),
            };
        }
        if let Some(iterations) = overrides.max_iterations {
            self.max_iterations = Some(iterations);
        }
        if let Some(interval_ms) = overrides.interval_ms {
            self.interval_ms = interval_ms;
        }
        if let Some(deadline_ms) = overrides.invocation_deadline_ms {
            self.invocation_deadline_ms = Some(deadline_ms);
        }
        if let Some(stride) = overrides.stride {
            self.window = Some(WindowConfig { stride });
        }
        if let Some(target) = overrides.target {
            self.target = target;
        }
        if overrides.no_debug {
            self.debug = false;
        }
    }
}

/// Values given on the command line; `None` and `false` leave the file alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub features: Option<PathBuf>,
    pub fixture: Option<PathBuf>,
    pub ffi: bool,
    pub max_iterations: Option<u64>,
    pub interval_ms: Option<u64>,
    pub invocation_deadline_ms: Option<u64>,
    pub stride: Option<usize>,
    pub target: Option<String>,
    pub no_debug: bool,
}
